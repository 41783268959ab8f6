use dioxus::prelude::*;

mod layout;
pub use layout::Layout;

mod private;
pub use private::PrivateRoute;

mod home;
pub use home::Home;

mod details;
pub use details::Details;

mod dashboard;
pub use dashboard::Dashboard;

mod new_listing;
pub use new_listing::NewListing;

mod sign_in;
pub use sign_in::SignIn;

mod sign_up;
pub use sign_up::SignUp;

/// Large logo above the sign-in and sign-up forms.
const LOGO: Asset = asset!("/assets/logo.svg");
