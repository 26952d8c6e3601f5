use restmock::config::{EndpointConfig, ServerSettings, Settings, StorageBackend, StorageSettings};
use std::collections::BTreeMap;
use std::net::SocketAddr;

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

/// Declarations every test server starts with.
pub fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig {
            name: "Users".to_string(),
            endpoint: "users".to_string(),
            methods: "all".to_string(),
            fields: BTreeMap::from([
                ("name".to_string(), "string".to_string()),
                ("age".to_string(), "integer".to_string()),
            ]),
            count: 3,
        },
        EndpointConfig {
            name: "Products".to_string(),
            endpoint: "products".to_string(),
            methods: "GET".to_string(),
            fields: BTreeMap::from([
                ("price".to_string(), "double".to_string()),
                ("inStock".to_string(), "boolean".to_string()),
            ]),
            count: 2,
        },
    ]
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_storage(StorageSettings::default(), default_endpoints()).await
    }

    pub async fn sqlite() -> Self {
        let storage = StorageSettings {
            backend: StorageBackend::Sqlite,
            url: Some("sqlite::memory:".to_string()),
            ..StorageSettings::default()
        };
        Self::with_storage(storage, default_endpoints()).await
    }

    pub async fn with_storage(storage: StorageSettings, endpoints: Vec<EndpointConfig>) -> Self {
        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            storage,
            definitions: None,
            endpoints,
        };

        let app = restmock::bootstrap(&settings).await.unwrap();
        let router = restmock::create_app(app);

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        TestServer { addr, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
