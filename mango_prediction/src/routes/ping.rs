const PING_MESSAGE: &str = "Mango Disease Detection";

pub async fn ping() -> &'static str {
    PING_MESSAGE
}
