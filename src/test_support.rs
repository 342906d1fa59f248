//! Local HTTP responder used in place of the forecast API in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves one canned `(status, body)` response per incoming connection, in order.
///
/// Returns the forecast URL to request and a counter of answered requests.
pub(crate) async fn serve(
    responses: Vec<(u16, String)>,
) -> std::io::Result<(String, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buffer = [0u8; 4096];
            let _ = stream.read(&mut buffer).await;
            counter.fetch_add(1, Ordering::SeqCst);

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    Ok((format!("http://{addr}/v1/forecast"), hits))
}

/// Accepts connections and never answers. Returns the forecast URL to request.
pub(crate) async fn silent() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            open.push(stream);
        }
    });

    Ok(format!("http://{addr}/v1/forecast"))
}

/// An Open-Meteo style body with the given `current` values.
pub(crate) fn current_body(time: &str, temperature: f64, wind_speed: f64) -> String {
    format!(
        r#"{{"latitude":39.74,"longitude":-104.99,"current":{{"time":"{time}","interval":900,"temperature_2m":{temperature},"wind_speed_10m":{wind_speed}}}}}"#
    )
}

/// A URL nothing listens on.
pub(crate) const UNREACHABLE_URL: &str = "http://127.0.0.1:1/v1/forecast";
