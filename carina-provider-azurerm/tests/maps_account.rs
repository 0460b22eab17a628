//! Lifecycle tests for the Maps account resource against an in-memory API

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use carina_core::provider::{Provider, ProviderErrorKind};
use carina_core::registry::ResourceRegistry;
use carina_core::resource::{Resource, ResourceId, State, Value};
use carina_core::timeouts::ResourceTimeouts;
use carina_provider_azurerm::AzurermProvider;
use carina_provider_azurerm::error::{AzureError, AzureResult};
use carina_provider_azurerm::maps::models::{
    MapsAccount, MapsAccountKeys, MapsAccountProperties,
};
use carina_provider_azurerm::maps::{AccountId, MapsAccountResource, MapsAccountsClient};

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

/// In-memory stand-in for the Maps accounts API
#[derive(Default)]
struct FakeMapsAccounts {
    accounts: Mutex<HashMap<(String, String), MapsAccount>>,
    writes: AtomicUsize,
    deletes: AtomicUsize,
    omit_id: AtomicBool,
    fail_gets: AtomicBool,
    fail_list_keys: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeMapsAccounts {
    fn key(resource_group: &str, name: &str) -> (String, String) {
        (resource_group.to_lowercase(), name.to_lowercase())
    }

    fn account_id(resource_group: &str, name: &str) -> String {
        AccountId::new(SUBSCRIPTION, resource_group, name).to_string()
    }

    /// Simulate an account created outside of Carina
    fn seed(&self, resource_group: &str, name: &str, sku: &str) {
        let account = MapsAccount {
            id: Some(Self::account_id(resource_group, name)),
            name: Some(name.to_string()),
            location: Some("global".to_string()),
            sku: Some(carina_provider_azurerm::maps::models::Sku {
                name: sku.to_string(),
                tier: None,
            }),
            properties: Some(MapsAccountProperties {
                unique_id: Some(format!("client-{}", name)),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(Self::key(resource_group, name), account);
    }

    /// Simulate an account removed outside of Carina
    fn remove(&self, resource_group: &str, name: &str) {
        self.accounts
            .lock()
            .unwrap()
            .remove(&Self::key(resource_group, name));
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn maybe_delay(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn not_found(name: &str) -> AzureError {
        AzureError::Api {
            status: 404,
            code: "ResourceNotFound".to_string(),
            message: format!("The Resource 'Microsoft.Maps/accounts/{}' was not found.", name),
        }
    }

    fn server_error() -> AzureError {
        AzureError::Api {
            status: 500,
            code: "InternalServerError".to_string(),
            message: "Something went wrong".to_string(),
        }
    }
}

#[async_trait]
impl MapsAccountsClient for FakeMapsAccounts {
    async fn get(&self, resource_group: &str, name: &str) -> AzureResult<MapsAccount> {
        self.maybe_delay().await;
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.accounts
            .lock()
            .unwrap()
            .get(&Self::key(resource_group, name))
            .cloned()
            .ok_or_else(|| Self::not_found(name))
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &MapsAccount,
    ) -> AzureResult<MapsAccount> {
        self.maybe_delay().await;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut accounts = self.accounts.lock().unwrap();
        let key = Self::key(resource_group, name);
        let unique_id = accounts
            .get(&key)
            .and_then(|a| a.properties.as_ref())
            .and_then(|p| p.unique_id.clone())
            .unwrap_or_else(|| format!("client-{}", name));
        let id = if self.omit_id.load(Ordering::SeqCst) {
            None
        } else {
            Some(Self::account_id(resource_group, name))
        };

        let account = MapsAccount {
            id,
            name: Some(name.to_string()),
            resource_type: Some("Microsoft.Maps/accounts".to_string()),
            location: parameters.location.clone(),
            sku: parameters.sku.clone(),
            kind: Some("Gen1".to_string()),
            tags: parameters.tags.clone(),
            properties: Some(MapsAccountProperties {
                unique_id: Some(unique_id),
                disable_local_auth: Some(false),
                provisioning_state: Some("Succeeded".to_string()),
            }),
        };
        accounts.insert(key, account.clone());
        Ok(account)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        self.maybe_delay().await;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        // ARM answers 204 for accounts that do not exist
        self.remove(resource_group, name);
        Ok(())
    }

    async fn list_keys(&self, resource_group: &str, name: &str) -> AzureResult<MapsAccountKeys> {
        if self.fail_list_keys.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        if !self
            .accounts
            .lock()
            .unwrap()
            .contains_key(&Self::key(resource_group, name))
        {
            return Err(Self::not_found(name));
        }
        Ok(MapsAccountKeys {
            primary_key: Some(format!("pk-{}", name)),
            secondary_key: Some(format!("sk-{}", name)),
            ..Default::default()
        })
    }
}

fn setup() -> (Arc<FakeMapsAccounts>, AzurermProvider) {
    let _ = env_logger::builder().is_test(true).try_init();
    let fake = Arc::new(FakeMapsAccounts::default());
    let registry =
        ResourceRegistry::new().with_handler(Box::new(MapsAccountResource::new(fake.clone())));
    (fake, AzurermProvider::with_registry(registry))
}

fn maps_account(name: &str, resource_group: &str, sku: &str) -> Resource {
    Resource::new("maps_account", "main")
        .with_attribute("name", name)
        .with_attribute("resource_group_name", resource_group)
        .with_attribute("sku_name", sku)
}

fn tags(entries: &[(&str, &str)]) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect(),
    )
}

fn id() -> ResourceId {
    ResourceId::new("maps_account", "main")
}

fn computed_fields(state: &State) -> Vec<&str> {
    let mut fields: Vec<&str> = ["x_ms_client_id", "primary_access_key", "secondary_access_key"]
        .into_iter()
        .filter(|f| state.attributes.contains_key(*f))
        .collect();
    fields.sort_unstable();
    fields
}

#[tokio::test]
async fn create_then_read_returns_inputs() {
    let (_fake, provider) = setup();
    let triples = [
        ("mymaps", "rg1", "S0"),
        ("maps-2", "rg_two", "S1"),
        ("Maps.Three", "rg(3)", "G2"),
    ];

    for (name, resource_group, sku) in triples {
        let created = provider
            .create(&maps_account(name, resource_group, sku))
            .await
            .unwrap();
        let identifier = created.identifier.clone().unwrap();

        let read = provider.read(&id(), Some(&identifier)).await.unwrap();
        assert!(read.exists);
        assert_eq!(read.get_str("name"), Some(name));
        assert_eq!(read.get_str("resource_group_name"), Some(resource_group));
        assert_eq!(read.get_str("sku_name"), Some(sku));
        assert_eq!(read, created);
    }
}

#[tokio::test]
async fn create_populates_keys_and_identifier() {
    let (_fake, provider) = setup();
    let state = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap();

    assert_eq!(
        state.identifier.as_deref(),
        Some(
            "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.Maps/accounts/mymaps"
        )
    );
    assert_eq!(state.get_str("sku_name"), Some("S0"));
    assert!(!state.get_str("primary_access_key").unwrap().is_empty());
    assert!(!state.get_str("secondary_access_key").unwrap().is_empty());
    assert_eq!(state.get_str("x_ms_client_id"), Some("client-mymaps"));
    assert_eq!(state.attributes.get("tags"), Some(&tags(&[])));
}

#[tokio::test]
async fn create_accepts_dsl_enum_sku() {
    let (_fake, provider) = setup();
    let state = provider
        .create(&maps_account("mymaps", "rg1", "azurerm.maps_account.SkuName.G2"))
        .await
        .unwrap();
    assert_eq!(state.get_str("sku_name"), Some("G2"));
}

#[tokio::test]
async fn second_create_fails_with_already_exists() {
    let (fake, provider) = setup();
    let resource = maps_account("mymaps", "rg1", "S0");

    let first = provider.create(&resource).await.unwrap();
    let err = provider.create(&resource).await.unwrap_err();

    let first_id = first.identifier.unwrap();
    assert_eq!(
        err.kind,
        ProviderErrorKind::AlreadyExists {
            identifier: first_id.clone()
        }
    );
    assert!(err.to_string().contains(&first_id));
    assert_eq!(fake.writes(), 1);
}

#[tokio::test]
async fn create_does_not_adopt_out_of_band_account() {
    let (fake, provider) = setup();
    fake.seed("rg1", "mymaps", "S1");

    let err = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap_err();

    assert!(err.is_already_exists());
    assert_eq!(fake.writes(), 0);
}

#[tokio::test]
async fn create_fails_when_existence_probe_fails() {
    let (fake, provider) = setup();
    fake.fail_gets.store(true, Ordering::SeqCst);

    let err = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Api);
    assert!(err.message.contains("existing Maps Account \"mymaps\""));
    assert_eq!(fake.writes(), 0);
}

#[tokio::test]
async fn create_without_assigned_id_is_inconsistent() {
    let (fake, provider) = setup();
    fake.omit_id.store(true, Ordering::SeqCst);

    let err = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Inconsistent);
    assert_eq!(fake.writes(), 1);
}

#[tokio::test]
async fn create_rejects_invalid_attributes_before_any_call() {
    let (fake, provider) = setup();

    let err = provider
        .create(&maps_account("mymaps", "rg1", "S9"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Validation);

    let err = provider
        .create(&maps_account("mymaps", "rg1", "S0").with_attribute("primary_access_key", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Validation);

    assert_eq!(fake.writes(), 0);
}

#[tokio::test]
async fn read_of_removed_account_clears_identifier() {
    let (fake, provider) = setup();
    let created = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap();

    fake.remove("rg1", "mymaps");
    let state = provider
        .read(&id(), created.identifier.as_deref())
        .await
        .unwrap();

    assert!(!state.exists);
    assert!(state.identifier.is_none());
    assert!(computed_fields(&state).is_empty());
}

#[tokio::test]
async fn read_populates_exactly_three_computed_fields() {
    let (fake, provider) = setup();
    fake.seed("rg1", "mymaps", "S1");
    let identifier = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.Maps/accounts/mymaps";

    let state = provider.read(&id(), Some(identifier)).await.unwrap();

    assert!(state.exists);
    assert_eq!(state.identifier.as_deref(), Some(identifier));
    assert_eq!(
        computed_fields(&state),
        vec!["primary_access_key", "secondary_access_key", "x_ms_client_id"]
    );
    assert_eq!(state.attributes.len(), 7);
}

#[tokio::test]
async fn read_without_identifier_is_not_found() {
    let (_fake, provider) = setup();
    let state = provider.read(&id(), None).await.unwrap();
    assert!(!state.exists);
}

#[tokio::test]
async fn read_fails_when_keys_cannot_be_listed() {
    let (fake, provider) = setup();
    let created = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap();
    fake.fail_list_keys.store(true, Ordering::SeqCst);

    let err = provider
        .read(&id(), created.identifier.as_deref())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Api);
    assert!(err.message.contains("access keys"));
}

#[tokio::test]
async fn read_fails_on_api_error() {
    let (fake, provider) = setup();
    fake.seed("rg1", "mymaps", "S0");
    fake.fail_gets.store(true, Ordering::SeqCst);

    let identifier = AccountId::new(SUBSCRIPTION, "rg1", "mymaps").to_string();
    let err = provider.read(&id(), Some(&identifier)).await.unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Api);
    assert_eq!(err.resource_id, Some(id()));
}

#[tokio::test]
async fn malformed_identifier_is_rejected() {
    let (_fake, provider) = setup();
    let bad = "/subscriptions/sub/resourceGroups/rg1";

    let err = provider.read(&id(), Some(bad)).await.unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::InvalidIdentifier);

    let err = provider.delete(&id(), bad).await.unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::InvalidIdentifier);

    let err = provider.import(&id(), bad).await.unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::InvalidIdentifier);
}

#[tokio::test]
async fn delete_twice_succeeds() {
    let (fake, provider) = setup();
    let created = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap();
    let identifier = created.identifier.unwrap();

    provider.delete(&id(), &identifier).await.unwrap();
    provider.delete(&id(), &identifier).await.unwrap();

    assert_eq!(fake.deletes.load(Ordering::SeqCst), 2);
    let state = provider.read(&id(), Some(&identifier)).await.unwrap();
    assert!(!state.exists);
}

#[tokio::test]
async fn update_resubmits_tags_without_existence_check() {
    let (fake, provider) = setup();
    let created = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap();
    let identifier = created.identifier.clone().unwrap();

    let desired =
        maps_account("mymaps", "rg1", "S0").with_attribute("tags", tags(&[("env", "prod")]));
    let updated = provider
        .update(&id(), &identifier, &created, &desired)
        .await
        .unwrap();

    assert_eq!(updated.attributes.get("tags"), Some(&tags(&[("env", "prod")])));
    assert_eq!(updated.identifier.as_deref(), Some(identifier.as_str()));
    assert_eq!(
        updated.get_str("x_ms_client_id"),
        created.get_str("x_ms_client_id")
    );
    assert_eq!(fake.writes(), 2);
}

#[tokio::test]
async fn update_is_idempotent() {
    let (fake, provider) = setup();
    let resource = maps_account("mymaps", "rg1", "S0");
    let created = provider.create(&resource).await.unwrap();
    let identifier = created.identifier.clone().unwrap();

    let first = provider
        .update(&id(), &identifier, &created, &resource)
        .await
        .unwrap();
    let second = provider
        .update(&id(), &identifier, &first, &resource)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fake.writes(), 3);
}

#[tokio::test]
async fn update_of_immutable_sku_requires_replacement() {
    let (fake, provider) = setup();
    let created = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap();
    let identifier = created.identifier.clone().unwrap();

    let err = provider
        .update(&id(), &identifier, &created, &maps_account("mymaps", "rg1", "S1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Validation);
    assert!(err.message.contains("sku_name"));
    assert_eq!(fake.writes(), 1);
}

#[tokio::test]
async fn update_tags_with_dsl_enum_sku() {
    let (fake, provider) = setup();
    for sku in ["SkuName.S0", "azurerm.maps_account.SkuName.S0"] {
        let name = format!("maps-{}", sku.len());
        let created = provider
            .create(&maps_account(&name, "rg1", sku))
            .await
            .unwrap();
        assert_eq!(created.get_str("sku_name"), Some("S0"));
        let identifier = created.identifier.clone().unwrap();

        let desired =
            maps_account(&name, "rg1", sku).with_attribute("tags", tags(&[("env", "prod")]));
        let updated = provider
            .update(&id(), &identifier, &created, &desired)
            .await
            .unwrap();

        assert_eq!(updated.get_str("sku_name"), Some("S0"));
        assert_eq!(updated.attributes.get("tags"), Some(&tags(&[("env", "prod")])));
    }
    assert_eq!(fake.writes(), 4);
}

#[tokio::test]
async fn create_rejects_foreign_enum_prefix() {
    let (fake, provider) = setup();
    let err = provider
        .create(&maps_account("mymaps", "rg1", "Bogus.S0"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Validation);
    assert_eq!(fake.writes(), 0);
}

#[tokio::test]
async fn import_existing_account() {
    let (fake, provider) = setup();
    fake.seed("rg1", "mymaps", "G2");
    let identifier = AccountId::new(SUBSCRIPTION, "rg1", "mymaps").to_string();

    let state = provider.import(&id(), &identifier).await.unwrap();
    assert!(state.exists);
    assert_eq!(state.get_str("sku_name"), Some("G2"));
}

#[tokio::test]
async fn import_missing_account_fails() {
    let (_fake, provider) = setup();
    let identifier = AccountId::new(SUBSCRIPTION, "rg1", "missing").to_string();

    let err = provider.import(&id(), &identifier).await.unwrap_err();
    assert!(err.message.contains("non-existent"));
}

#[tokio::test]
async fn unknown_resource_type_is_rejected() {
    let (_fake, provider) = setup();
    let err = provider
        .create(&Resource::new("storage_account", "main"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::UnknownResourceType);
}

#[tokio::test]
async fn provider_exposes_schema() {
    let (_fake, provider) = setup();
    assert_eq!(provider.name(), "azurerm");
    let schemas = provider.schemas();
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].resource_type, "azurerm.maps_account");
}

#[tokio::test(start_paused = true)]
async fn slow_read_times_out() {
    let (fake, provider) = setup();
    fake.seed("rg1", "mymaps", "S0");
    *fake.delay.lock().unwrap() = Some(Duration::from_secs(600));
    let provider = provider.with_timeouts(
        "maps_account",
        ResourceTimeouts::default().with_read(Duration::from_secs(60)),
    );

    let identifier = AccountId::new(SUBSCRIPTION, "rg1", "mymaps").to_string();
    let err = provider.read(&id(), Some(&identifier)).await.unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Timeout);
    assert_eq!(err.resource_id, Some(id()));
}

#[tokio::test]
async fn stopped_provider_cancels_operations() {
    let (fake, provider) = setup();
    provider.stop();

    let err = provider
        .create(&maps_account("mymaps", "rg1", "S0"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Cancelled);
    assert_eq!(fake.writes(), 0);
}
