/// Shared test fixtures and utilities for test modules
#[allow(dead_code)]
pub mod fixtures {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use telegram_relay::delivery::DeliveryError;
    use telegram_relay::message::Message;
    use telegram_relay::traits::Deliverer;
    use teloxide::{ApiError, RequestError};

    pub const BOT_TOKEN: &str = "123456:TEST-bot-token";
    pub const BEARER_TOKEN: &str = "relay-secret";
    pub const CHAT_ID: i64 = -1001234567890;

    /// Creates a complete set of valid environment values
    pub fn valid_env() -> HashMap<&'static str, String> {
        let mut env = HashMap::new();
        env.insert("BOT_TOKEN", BOT_TOKEN.to_string());
        env.insert("BEARER_TOKEN", BEARER_TOKEN.to_string());
        env.insert("CHAT_ID", CHAT_ID.to_string());
        env.insert("PORT", "8080".to_string());
        env
    }

    /// Turns an env map into a lookup usable by `Config::from_lookup`
    pub fn lookup(env: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |key: &str| env.get(key).cloned()
    }

    /// `getMe` payload for a bot, as the Bot API returns it
    pub fn get_me_response() -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "result": {
                "id": 123456,
                "is_bot": true,
                "first_name": "Relay",
                "username": "relay_bot",
                "can_join_groups": true,
                "can_read_all_group_messages": false,
                "supports_inline_queries": false,
                "can_connect_to_business": false,
                "has_main_web_app": false
            }
        })
    }

    /// `sendMessage` payload echoing `text` back from `chat_id`
    pub fn send_message_response(chat_id: i64, text: &str) -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "result": {
                "message_id": 1,
                "date": 1_700_000_000i64,
                "chat": {"id": chat_id, "type": "private", "first_name": "Ops"},
                "from": {"id": 123456, "is_bot": true, "first_name": "Relay", "username": "relay_bot"},
                "text": text
            }
        })
    }

    /// Bot API error envelope
    pub fn api_error_response(code: u16, description: &str) -> serde_json::Value {
        serde_json::json!({
            "ok": false,
            "error_code": code,
            "description": description
        })
    }

    /// Deliverer double that records every message it is handed
    #[derive(Default)]
    pub struct RecordingDeliverer {
        pub fail: bool,
        pub delivered: Mutex<Vec<Message>>,
    }

    impl RecordingDeliverer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn delivered(&self) -> Vec<Message> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Deliverer for RecordingDeliverer {
        async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
            self.delivered.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(DeliveryError::NotSent(RequestError::Api(ApiError::BotBlocked)));
            }
            Ok(())
        }
    }
}
