//! Rich-text editing for the page builder of a small CMS.
//!
//! An [`surface::EditingSurface`] owns live HTML and a selection, the
//! [`dispatcher::CommandDispatcher`] turns toolbar actions into edits on it
//! and the [`sync::ContentSynchronizer`] hands the serialized HTML back to
//! whoever owns the document. [`editor::RichTextEditor`] ties the three
//! together behind the props a page builder form passes in.

pub mod cms;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod editor;
pub mod history;
pub mod html;
pub mod import;
pub mod logging;
pub mod page_builder;
pub mod prompt;
pub mod render;
pub mod selection;
pub mod surface;
pub mod sync;
pub mod theme;
pub mod toolbar;

pub use command::{Alignment, Command, CommandName, InlineFormat, ListKind};
pub use editor::{EditorProps, RichTextEditor};
pub use selection::{Selection, SelectionSnapshot};
pub use surface::{EditingSurface, SurfaceEvent};
pub use sync::{ContentSynchronizer, Mode, visible_text_length};
