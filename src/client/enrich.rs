//! # Profile Enrichment
//!
//! Attaches the author profile to customers for display. The lookup is a
//! single batched request per call regardless of how many customers are
//! enriched, and it never fails: an author that cannot be resolved gets the
//! placeholder profile instead.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::client::remote::RemoteStore;
use crate::shared::customer::Customer;
use crate::shared::profile::AuthorProfile;

/// Batch resolver for `created_by` author profiles
#[derive(Clone)]
pub struct ProfileEnricher {
    remote: Arc<dyn RemoteStore>,
}

impl ProfileEnricher {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }

    /// Attach author profiles to every customer that has a `created_by`
    ///
    /// Customers without one pass through with no profile.
    pub async fn enrich(&self, mut customers: Vec<Customer>) -> Vec<Customer> {
        let author_ids: Vec<String> = customers
            .iter()
            .filter_map(|c| c.created_by.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if author_ids.is_empty() {
            for customer in &mut customers {
                customer.author_profile = None;
            }
            return customers;
        }

        let resolved: HashMap<String, AuthorProfile> =
            match self.remote.select_profiles_by_ids(&author_ids).await {
                Ok(profiles) => profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
                Err(e) => {
                    tracing::warn!(
                        "Profile lookup for {} authors failed, using placeholders: {}",
                        author_ids.len(),
                        e
                    );
                    HashMap::new()
                }
            };

        for customer in &mut customers {
            customer.author_profile = customer.created_by.as_ref().map(|author| {
                resolved
                    .get(author)
                    .cloned()
                    .unwrap_or_else(|| AuthorProfile::placeholder(author.clone()))
            });
        }
        customers
    }

    /// Attach the caller's own name without a lookup
    ///
    /// Used for write results, where the author is the current user.
    pub fn annotate(mut customer: Customer, author_name: &str) -> Customer {
        customer.author_profile = customer
            .created_by
            .as_ref()
            .map(|author| AuthorProfile::new(author.clone(), author_name));
        customer
    }
}
