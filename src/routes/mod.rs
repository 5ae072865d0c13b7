/// Router Module Index
///
/// Page routers are split by access tier so each file maps onto one row of
/// the classification table. The edge guard sits in front of all of them and
/// decides from [`RouteTable`] alone; the split here is organisational.

/// Static `prefix -> tier` table and the classifier.
pub mod table;

/// Login and registration pages.
pub mod public;

/// Profile-editing pages. Reachable only with a session cookie.
pub mod protected;

/// Landing page, CV upload, health check.
pub mod neutral;

pub use table::{EXCLUDED_ROUTES, PROTECTED_ROUTES, PUBLIC_ROUTES, RouteClass, RouteTable};
