//! Bilingual blog authoring, autosave, translation and review.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/blogs` | Published blogs (public) |
//! | GET | `/api/blogs/{id}` | Read a published blog (public, counts a view) |
//! | POST | `/api/blogs` | Create a draft, or submit with `submit: true` |
//! | GET | `/api/blogs/mine` | Own blogs in any status |
//! | GET | `/api/blogs/{id}/edit` | Blog with unsaved autosave edits merged in |
//! | PATCH | `/api/blogs/{id}/draft` | Record an editor change (debounced save) |
//! | GET | `/api/blogs/{id}/draft` | Autosave state |
//! | POST | `/api/blogs/{id}/draft/flush` | Save pending edits now |
//! | POST | `/api/blogs/{id}/submit` | draft/rejected → pending_approval |
//! | POST | `/api/blogs/{id}/withdraw` | pending_approval → draft |
//! | POST | `/api/blogs/{id}/revise` | rejected → draft |
//! | POST | `/api/blogs/{id}/translate` | Fill the other language through the translator |
//! | DELETE | `/api/blogs/{id}` | Delete a blog |
//! | POST | `/api/translate` | Translate free text |
//! | GET | `/api/review/blogs` | Review queue (manager) |
//! | POST | `/api/review/blogs/{id}/approve` | pending_approval → approved |
//! | POST | `/api/review/blogs/{id}/reject` | pending_approval → rejected, with reason |
//! | POST | `/api/review/blogs/{id}/publish` | approved → published |
//! | POST | `/api/review/blogs/{id}/unpublish` | published → approved |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
