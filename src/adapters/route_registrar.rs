//! Binds every registered definition to the shared dispatcher
//!
//! Each definition gets at most two axum routes, `/api/<endpoint>` and
//! `/api/<endpoint>/:id`, carrying only the verbs the definition allows.
//! Handlers are closures over the endpoint name and the operation, so one
//! dispatcher serves every endpoint.

use axum::{
    extract::{rejection::JsonRejection, Path},
    routing::MethodRouter,
    Json, Router,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::definition_registry::DefinitionRegistry;
use crate::adapters::request_dispatcher::{DispatchInput, Operation, RequestDispatcher};
use crate::domain::{EndpointDefinition, HttpMethod, RegistrationError};

type JsonBody = Result<Json<Map<String, Value>>, JsonRejection>;

fn body_of(body: JsonBody) -> Result<Map<String, Value>, String> {
    body.map(|Json(body)| body).map_err(|rejection| rejection.body_text())
}

pub struct RouteRegistrar {
    registry: Arc<DefinitionRegistry>,
    dispatcher: Arc<RequestDispatcher>,
    /// (method, path pattern) -> owning endpoint
    bound: HashMap<(HttpMethod, String), String>,
    routes: Vec<(String, MethodRouter)>,
}

impl RouteRegistrar {
    pub fn new(registry: Arc<DefinitionRegistry>, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
            bound: HashMap::new(),
            routes: Vec::new(),
        }
    }

    /// Binds the routes for one definition.
    ///
    /// All of the definition's bindings are checked before any is added, so
    /// a failed call leaves the registrar unchanged.
    pub fn register(&mut self, definition: &EndpointDefinition) -> Result<(), RegistrationError> {
        let endpoint: Arc<str> = Arc::from(definition.endpoint_name());
        let collection_path = definition.base_path();
        let item_path = format!("{}/:id", collection_path);

        let mut collection_verbs = Vec::new();
        let mut item_verbs = Vec::new();
        if definition.allows(HttpMethod::Get) {
            collection_verbs.push(HttpMethod::Get);
            item_verbs.push(HttpMethod::Get);
        }
        if definition.allows(HttpMethod::Post) {
            collection_verbs.push(HttpMethod::Post);
        }
        if definition.allows(HttpMethod::Put) {
            item_verbs.push(HttpMethod::Put);
        }
        if definition.allows(HttpMethod::Delete) {
            item_verbs.push(HttpMethod::Delete);
        }

        let wanted = collection_verbs
            .iter()
            .map(|m| (*m, collection_path.as_str()))
            .chain(item_verbs.iter().map(|m| (*m, item_path.as_str())));
        for (method, path) in wanted.clone() {
            if let Some(owner) = self.bound.get(&(method, path.to_string())) {
                tracing::error!("Route {} {} is already bound by endpoint {}", method, path, owner);
                return Err(RegistrationError::DuplicateRoute {
                    method: method.to_string(),
                    path: path.to_string(),
                    endpoint: owner.clone(),
                });
            }
        }

        if !collection_verbs.is_empty() {
            let route = self.collection_route(&endpoint, &collection_verbs);
            self.routes.push((collection_path.clone(), route));
        }
        if !item_verbs.is_empty() {
            let route = self.item_route(&endpoint, &item_verbs);
            self.routes.push((item_path.clone(), route));
        }

        for (method, path) in wanted {
            tracing::info!("Bound {} {} for endpoint {}", method, path, endpoint);
            self.bound
                .insert((method, path.to_string()), endpoint.to_string());
        }
        Ok(())
    }

    /// Registers every definition in the registry, in declaration order, and
    /// returns the finished router.
    pub fn register_all(mut self) -> Result<Router, RegistrationError> {
        let registry = self.registry.clone();
        for definition in registry.definitions() {
            self.register(definition)?;
        }
        tracing::info!(
            "Registered {} routes for {} endpoints",
            self.bound.len(),
            registry.len()
        );
        Ok(self.into_router())
    }

    /// Bound (method, path pattern) pairs, sorted.
    pub fn bound_routes(&self) -> Vec<(HttpMethod, String)> {
        let mut routes: Vec<_> = self.bound.keys().cloned().collect();
        routes.sort();
        routes
    }

    pub fn into_router(self) -> Router {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, (path, route)| router.route(&path, route))
    }

    fn collection_route(&self, endpoint: &Arc<str>, verbs: &[HttpMethod]) -> MethodRouter {
        let mut route = MethodRouter::new();
        for verb in verbs {
            let dispatcher = self.dispatcher.clone();
            let endpoint = endpoint.clone();
            route = match verb {
                HttpMethod::Get => route.get(move || {
                    let d = dispatcher.clone();
                    let e = endpoint.clone();
                    async move { d.dispatch(Operation::List, &e, DispatchInput::none()).await }
                }),
                HttpMethod::Post => route.post(move |body: JsonBody| {
                    let d = dispatcher.clone();
                    let e = endpoint.clone();
                    async move {
                        d.dispatch(Operation::Create, &e, DispatchInput::with_body(body_of(body)))
                            .await
                    }
                }),
                _ => route,
            };
        }
        route
    }

    fn item_route(&self, endpoint: &Arc<str>, verbs: &[HttpMethod]) -> MethodRouter {
        let mut route = MethodRouter::new();
        for verb in verbs {
            let dispatcher = self.dispatcher.clone();
            let endpoint = endpoint.clone();
            route = match verb {
                HttpMethod::Get => route.get(move |Path(id): Path<String>| {
                    let d = dispatcher.clone();
                    let e = endpoint.clone();
                    async move { d.dispatch(Operation::Get, &e, DispatchInput::with_id(id)).await }
                }),
                HttpMethod::Put => route.put(move |Path(id): Path<String>, body: JsonBody| {
                    let d = dispatcher.clone();
                    let e = endpoint.clone();
                    async move {
                        let input = DispatchInput::with_id_and_body(id, body_of(body));
                        d.dispatch(Operation::Update, &e, input).await
                    }
                }),
                HttpMethod::Delete => route.delete(move |Path(id): Path<String>| {
                    let d = dispatcher.clone();
                    let e = endpoint.clone();
                    async move { d.dispatch(Operation::Delete, &e, DispatchInput::with_id(id)).await }
                }),
                _ => route,
            };
        }
        route
    }
}
