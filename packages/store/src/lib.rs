pub mod config;
pub mod documents;
pub mod error;
pub mod feed;
pub mod format;
pub mod guard;
pub mod identity;
pub mod listings;
pub mod memory;
pub mod models;
pub mod objects;
pub mod session;
pub mod validation;

pub use config::WebCarrosConfig;
pub use documents::{Direction, Document, DocumentStore, Filter, FilterOp, OrderBy, Query, Record};
pub use error::{IdentityError, ListingError, StoreError};
pub use feed::{FeedTicket, ListingFeed};
pub use guard::{GuardDecision, RouteGuard};
pub use identity::{IdentityBroadcaster, IdentityEvent, IdentityService, Subscription};
pub use listings::{DeleteReport, Marketplace};
pub use memory::{MemoryBackend, MemoryDocumentStore, MemoryIdentityService, MemoryObjectStore};
pub use models::{Identity, Listing, ListingPhoto, PendingPhoto};
pub use objects::ObjectStore;
pub use session::{Session, SessionHolder};
pub use validation::{FieldErrors, ListingForm, SignInForm, SignUpForm};
