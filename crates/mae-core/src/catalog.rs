//! Declarative table of every logbook category.
//!
//! Each category is one backend collection. The schema drives forms,
//! validation, ordering and which operations are offered, so the client has a
//! single CRUD implementation instead of one per page.

use crate::error::{MaeError, Result};

/// Input type of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text.
    Text,
    /// Multi-line text.
    LongText,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Integer.
    Number,
    /// One value out of a fixed set.
    Choice(&'static [&'static str]),
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::LongText => "long text",
            FieldKind::Date => "date",
            FieldKind::Number => "number",
            FieldKind::Choice(_) => "choice",
        }
    }
}

/// Where a form field starts out before the user types anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Empty,
    Value(&'static str),
    /// Collection size + 1, for the numbered categories.
    NextNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: FieldDefault,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            default: FieldDefault::Empty,
        }
    }

    const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: FieldDefault::Empty,
        }
    }

    const fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }
}

/// How `list()` orders the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Keep the order the backend returned.
    Server,
    /// Ascending by the named numeric field.
    AscendingNumber(&'static str),
}

/// Schema of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySchema {
    /// Stable key, also the collection endpoint under the API prefix.
    pub key: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    /// Append-only categories have no update path.
    pub editable: bool,
    pub ordering: Ordering,
    /// Offers a random pick over the collection.
    pub dice: bool,
}

impl CategorySchema {
    pub fn endpoint(&self) -> &'static str {
        self.key
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const ORGASME_TYPES: &[&str] = &["autorisé", "ruiné", "refusé"];

static CATEGORIES: &[CategorySchema] = &[
    CategorySchema {
        key: "punitions",
        title: "Punitions",
        fields: &[
            FieldSpec::required("date", "Date", FieldKind::Date),
            FieldSpec::required("nature", "Nature", FieldKind::Text),
            FieldSpec::required("raison", "Raison", FieldKind::LongText),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "orgasmes",
        title: "Orgasmes",
        fields: &[
            FieldSpec::required("date", "Date", FieldKind::Date),
            FieldSpec::required("type", "Type", FieldKind::Choice(ORGASME_TYPES))
                .with_default(FieldDefault::Value("autorisé")),
            FieldSpec::optional("notes", "Notes", FieldKind::LongText),
        ],
        editable: false,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "carnet",
        title: "Carnet intime",
        fields: &[
            FieldSpec::required("date", "Date", FieldKind::Date),
            FieldSpec::required("content", "Contenu", FieldKind::LongText),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "histoires",
        title: "Histoires",
        fields: &[
            FieldSpec::required("title", "Titre", FieldKind::Text),
            FieldSpec::required("date", "Date", FieldKind::Date),
            FieldSpec::required("content", "Contenu", FieldKind::LongText),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "liens",
        title: "Liens utiles",
        fields: &[
            FieldSpec::required("title", "Titre", FieldKind::Text),
            FieldSpec::required("url", "URL", FieldKind::Text),
            FieldSpec::optional("description", "Description", FieldKind::LongText),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "seances",
        title: "Séances",
        fields: &[
            FieldSpec::required("date", "Date", FieldKind::Date),
            FieldSpec::required("title", "Titre", FieldKind::Text),
            FieldSpec::optional("description", "Description", FieldKind::LongText),
            FieldSpec::optional("duration", "Durée", FieldKind::Text),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "inventaire",
        title: "Inventaire",
        fields: &[
            FieldSpec::required("name", "Nom", FieldKind::Text),
            FieldSpec::optional("category", "Catégorie", FieldKind::Text),
            FieldSpec::required("quantity", "Quantité", FieldKind::Number)
                .with_default(FieldDefault::Value("1")),
            FieldSpec::optional("description", "Description", FieldKind::LongText),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "documents",
        title: "Documents",
        fields: &[
            FieldSpec::required("title", "Titre", FieldKind::Text),
            FieldSpec::required("url", "URL", FieldKind::Text),
            FieldSpec::optional("description", "Description", FieldKind::LongText),
        ],
        editable: false,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "idees",
        title: "Idées",
        fields: &[
            FieldSpec::required("title", "Titre", FieldKind::Text),
            FieldSpec::optional("description", "Description", FieldKind::LongText),
            FieldSpec::required("theme", "Thématique", FieldKind::Text),
            FieldSpec::optional("sous_theme", "Sous-thématique", FieldKind::Text),
        ],
        editable: true,
        ordering: Ordering::Server,
        dice: false,
    },
    CategorySchema {
        key: "de10",
        title: "Dé 10",
        fields: &[
            FieldSpec::required("number", "Numéro", FieldKind::Number)
                .with_default(FieldDefault::NextNumber),
            FieldSpec::required("text", "Texte", FieldKind::Text),
        ],
        editable: true,
        ordering: Ordering::AscendingNumber("number"),
        dice: true,
    },
    CategorySchema {
        key: "rituels",
        title: "Rituels",
        fields: &[
            FieldSpec::required("number", "Numéro", FieldKind::Number)
                .with_default(FieldDefault::NextNumber),
            FieldSpec::required("text", "Texte", FieldKind::Text),
        ],
        editable: true,
        ordering: Ordering::AscendingNumber("number"),
        dice: false,
    },
];

/// All categories, in menu order.
pub fn all() -> &'static [CategorySchema] {
    CATEGORIES
}

/// Looks up a category by key.
pub fn find(key: &str) -> Result<&'static CategorySchema> {
    CATEGORIES
        .iter()
        .find(|c| c.key == key)
        .ok_or_else(|| MaeError::UnknownCategory(key.to_string()))
}
