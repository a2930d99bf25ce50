//! The CMS screens that host the editor, modelled at their boundary.
//!
//! Requests go through an [`ApiClient`], list reads through a
//! [`QueryCache`] and user feedback through a [`Toaster`]. Calls are
//! synchronous from the caller's point of view; a failed request leaves
//! local state as it was and raises one localized toast.

mod api;
mod cache;
mod equipment;
mod toast;

pub use api::{ApiClient, ApiError, MemoryApi, Method};
pub use cache::QueryCache;
pub use equipment::{EQUIPMENT_PATH, Equipment, EquipmentForm, EquipmentScreen};
pub use toast::{Toast, ToastLog, ToastVariant, Toaster};
