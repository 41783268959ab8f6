//! View state of a listing grid fed by asynchronous requests.
//!
//! Requests may overlap (a user typing a search while the first page is still
//! loading). Each request takes a [`FeedTicket`] from [`ListingFeed::begin`];
//! only the result carrying the latest ticket is applied.

use crate::models::Listing;

/// Generation token of one listing request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedTicket(u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingFeed {
    generation: u64,
    loading: bool,
    listings: Vec<Listing>,
}

impl ListingFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any request still in flight.
    pub fn begin(&mut self) -> FeedTicket {
        self.generation += 1;
        self.loading = true;
        FeedTicket(self.generation)
    }

    fn is_current(&self, ticket: FeedTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply a result. Returns false (and changes nothing) if a newer request
    /// has started since `ticket` was issued.
    pub fn apply(&mut self, ticket: FeedTicket, listings: Vec<Listing>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!("Dropping stale listing result {}", ticket.0);
            return false;
        }
        self.listings = listings;
        self.loading = false;
        true
    }

    /// Finish a failed request, keeping the listings shown so far.
    pub fn fail(&mut self, ticket: FeedTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        true
    }

    /// Remove a deleted listing from the grid.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.listings.len();
        self.listings.retain(|l| l.id != id);
        self.listings.len() != before
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    fn listing(id: &str) -> Listing {
        Listing {
            id: id.into(),
            name: id.to_uppercase(),
            model: "LT".into(),
            description: String::new(),
            year: 2019,
            price: 1.0,
            city: "X".into(),
            odometer_km: 1,
            phone: "11987654321".into(),
            owner: Identity::new("u1", None, None),
            photos: vec![],
            created: None,
        }
    }

    #[test]
    fn test_stale_result_is_not_applied() {
        let mut feed = ListingFeed::new();
        let first = feed.begin();
        let second = feed.begin();

        assert!(feed.apply(second, vec![listing("gol")]));
        assert!(!feed.apply(first, vec![listing("onix"), listing("civic")]));

        assert_eq!(feed.listings().len(), 1);
        assert_eq!(feed.listings()[0].id, "gol");
        assert!(!feed.is_loading());
    }

    #[test]
    fn test_stale_failure_keeps_loading_state() {
        let mut feed = ListingFeed::new();
        let first = feed.begin();
        let _second = feed.begin();
        assert!(!feed.fail(first));
        assert!(feed.is_loading());
    }

    #[test]
    fn test_remove_deleted_listing() {
        let mut feed = ListingFeed::new();
        let ticket = feed.begin();
        feed.apply(ticket, vec![listing("gol"), listing("onix")]);

        assert!(feed.remove("gol"));
        assert!(!feed.remove("gol"));
        assert_eq!(feed.listings()[0].id, "onix");
    }
}
