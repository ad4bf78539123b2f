//! JSON frames exchanged with the WebSocket bridge.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "auth")]
    Auth {
        client_id: String,
        username: String,
        token: String,
    },
    #[serde(rename = "subscribe")]
    Subscribe { topic: String, qos: u8 },
    #[serde(rename = "publish")]
    Publish {
        topic: String,
        payload: String,
        message_id: String,
        qos: u8,
        retain: bool,
    },
    #[serde(rename = "ack")]
    Ack { message_id: String },
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "authenticated")]
    Authenticated {},
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "message")]
    Message {
        topic: String,
        payload: String,
        #[serde(default)]
        timestamp: i64,
        #[serde(default)]
        message_id: String,
        #[serde(default)]
        qos: u8,
    },
}
