//! HTTP API for the taskdeps dependency graph.
//!
//! Exposes dependency creation, update, soft deletion, listing, chain walks,
//! cycle checks and transition validation over JSON, backed by any
//! [`taskdeps::storage::DependencyStorage`].
//!
//! # Routes
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | POST | `/api/dependencies` | Create an edge |
//! | GET/PUT/DELETE | `/api/dependencies/:id` | Read, change or deactivate an edge |
//! | GET | `/api/dependencies/tasks/:taskId` | Edges of a task |
//! | GET | `/api/dependencies/tasks/:taskId/chain` | Transitive chain |
//! | POST | `/api/dependencies/tasks/:taskId/validate` | Check a status change |
//! | GET | `/api/dependencies/projects/:projectId` | Edges of a project |
//! | POST | `/api/dependencies/check-circular` | Ask whether an edge would close a cycle |
//! | GET/PUT | `/api/tasks/:id` | Task snapshot sync |
//! | POST | `/api/tasks/:id/status` | Dependency-checked status change |
//! | GET | `/health` | Liveness |

pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use server::{build_app, serve, start_server};
pub use state::AppState;
