use std::sync::Mutex;

use visita_rust::api::{AgentId, PropertyId};
use visita_rust::models::{Posting, PostingStatus};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily set or removed.
///
/// Env vars are process-global, so concurrent tests that touch them race;
/// this serializes those tests and restores the previous values afterwards,
/// including on panic.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");

    let mut restore: Vec<(String, Option<String>)> = Vec::new();
    for (key, value) in changes {
        if !restore.iter().any(|(k, _)| k == key) {
            restore.push((key.to_string(), std::env::var(key).ok()));
        }
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    let _restore = RestoreEnv(restore);

    f()
}

struct RestoreEnv(Vec<(String, Option<String>)>);

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        for (key, value) in self.0.drain(..) {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// Minimal posting fixture owned by `publisher`.
pub fn posting_fixture(publisher: AgentId, title: &str) -> Posting {
    Posting {
        id: PropertyId::generate(),
        source_listing_id: format!("src-{}", title),
        title: title.to_string(),
        operation_type: "Venta".to_string(),
        amount: 150_000,
        amount_currency: "USD".to_string(),
        expensas: None,
        expensas_currency: None,
        description: None,
        address: None,
        latitude: None,
        longitude: None,
        status: PostingStatus::Active,
        realestate_type_name: None,
        url: format!("https://www.argenprop.com/{}", title),
        whatsapp: None,
        created_date: None,
        modified_date: None,
        covered_area: None,
        total_area: None,
        uncovered_area: None,
        rooms: None,
        bedrooms: None,
        bathrooms: None,
        garages: None,
        floor: None,
        unit: None,
        neighborhood: None,
        city: None,
        state: None,
        country: None,
        has_video: false,
        has_tour: false,
        has_plans: false,
        reserved: false,
        source: "argenprop".to_string(),
        publisher_id: publisher,
    }
}
