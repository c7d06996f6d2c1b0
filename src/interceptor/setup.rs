//! One-call attachment of every adapter a host application uses.
//!
//! Host code registers its pipeline clients in a [`ClientRegistry`];
//! [`auto_setup_network_logging`] then attaches the recorder to each of them
//! and to the ambient fetch slot.

use super::{attach_fetch, attach_pipeline, Detach};
use crate::client::PipelineClient;
use crate::recorder::NetworkRecorder;
use log::info;
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

/// Which adapters [`setup_network_logging`] attaches.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Pipeline clients to attach to.
    pub clients: Vec<PipelineClient>,

    /// Whether to attach to the ambient fetch slot. Defaults to true.
    pub fetch: bool,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            clients: Vec::new(),
            fetch: true,
        }
    }
}

impl SetupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: PipelineClient) -> Self {
        self.clients.push(client);
        self
    }

    pub fn with_fetch(mut self, enabled: bool) -> Self {
        self.fetch = enabled;
        self
    }
}

/// Attaches `recorder` to the adapters listed in `options`.
///
/// # Returns
///
/// A single handle detaching every adapter that was attached.
pub fn setup_network_logging(recorder: &NetworkRecorder, options: SetupOptions) -> Detach {
    let mut handles: Vec<Detach> = options
        .clients
        .iter()
        .map(|client| attach_pipeline(client, recorder))
        .collect();

    if options.fetch {
        handles.push(attach_fetch(recorder));
    }

    info!(
        "Network logging set up ({} pipeline clients, ambient fetch: {})",
        options.clients.len(),
        options.fetch
    );
    Detach::combine(handles)
}

/// Named pipeline clients known to the host application.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<Vec<(String, PipelineClient)>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `client` under `name`, replacing any client with that name.
    pub fn register(&self, name: impl Into<String>, client: PipelineClient) {
        let name = name.into();
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        match clients.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = client,
            None => clients.push((name, client)),
        }
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        let before = clients.len();
        clients.retain(|(existing, _)| existing != name);
        clients.len() != before
    }

    pub fn get(&self, name: &str) -> Option<PipelineClient> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, client)| client.clone())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn clients(&self) -> Vec<PipelineClient> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, client)| client.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static CLIENT_REGISTRY: Lazy<ClientRegistry> = Lazy::new(ClientRegistry::new);

/// Process-wide registry for hosts that do not keep their own.
pub fn client_registry() -> &'static ClientRegistry {
    &CLIENT_REGISTRY
}

/// Attaches `recorder` to every client in `registry` and to the ambient
/// fetch slot.
pub fn auto_setup_network_logging(recorder: &NetworkRecorder, registry: &ClientRegistry) -> Detach {
    let names = registry.names();
    if !names.is_empty() {
        info!("Found pipeline clients: {}", names.join(", "));
    }

    let options = SetupOptions {
        clients: registry.clients(),
        fetch: true,
    };
    setup_network_logging(recorder, options)
}
