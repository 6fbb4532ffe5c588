use crate::api::ApiClient;

/// Serves `router` on an ephemeral local port and returns its origin.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A client whose base URL is `{origin}/api`, matching the backend layout.
pub fn client_for(origin: &str) -> ApiClient {
    ApiClient::new(&format!("{}/api", origin), origin, None).unwrap()
}
