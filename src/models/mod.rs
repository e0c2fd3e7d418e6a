pub mod annotation;
pub mod category;
pub mod localized;
pub mod option;
pub mod pecha;

pub use annotation::{annotations_from_value, AnnotationEntry};
pub use category::{CatalogEntry, CategoryCatalog, CategoryNode, CategoryTree, NodeId, ParseError};
pub use localized::{LanguagePolicy, LocalizedText};
pub use option::SelectableOption;
pub use pecha::{PechaMetadata, Relation, RelationFilter};
