// Route handlers, one module per resource:
//   users   - registration (public)
//   auth    - login (public), current user (protected)
//   profile - profile CRUD, experience/education, github lookup
//   posts   - post CRUD, likes, comments (all protected)
pub mod auth;
pub mod posts;
pub mod profile;
pub mod users;
