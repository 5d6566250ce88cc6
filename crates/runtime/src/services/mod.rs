mod accounts;
mod badges;
mod experience;
mod favorites;
mod feed;
mod forum;
mod moderation;
mod projects;
mod ratings;
mod search;
mod templates;

pub use accounts::{AccountSettings, Accounts, AuthenticatedUser, Session};
pub use badges::BadgeAwarder;
pub use experience::ExperienceAwarder;
pub use favorites::FavoriteToggler;
pub use feed::Feed;
pub use forum::Forum;
pub use moderation::Moderation;
pub use projects::Projects;
pub use ratings::RatingAggregator;
pub use search::{Search, SearchKind, SearchResults};
pub use templates::Templates;

use crate::store::SharedStore;

/// Every component wired against one store.
#[derive(Clone)]
pub struct Nexus {
    pub accounts: Accounts,
    pub experience: ExperienceAwarder,
    pub badges: BadgeAwarder,
    pub ratings: RatingAggregator,
    pub favorites: FavoriteToggler,
    pub feed: Feed,
    pub forum: Forum,
    pub projects: Projects,
    pub templates: Templates,
    pub moderation: Moderation,
    pub search: Search,
}

impl Nexus {
    pub fn new(store: SharedStore, settings: AccountSettings) -> Self {
        let experience = ExperienceAwarder::new(store.clone());
        Self {
            accounts: Accounts::new(store.clone(), settings),
            badges: BadgeAwarder::new(store.clone()),
            ratings: RatingAggregator::new(store.clone()),
            favorites: FavoriteToggler::new(store.clone()),
            feed: Feed::new(store.clone(), experience.clone()),
            forum: Forum::new(store.clone(), experience.clone()),
            projects: Projects::new(store.clone(), experience.clone()),
            templates: Templates::new(store.clone()),
            moderation: Moderation::new(store.clone()),
            search: Search::new(store),
            experience,
        }
    }
}
