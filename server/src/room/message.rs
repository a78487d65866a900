use common::games::gomoku::StoneType;
use common::{ParticipantId, RoomId, proto};

pub const SYSTEM_SENDER: &str = "SYSTEM";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomChannel {
    Chat,
    Move,
}

impl RoomChannel {
    pub fn to_proto(&self) -> i32 {
        match self {
            RoomChannel::Chat => proto::Channel::Chat.into(),
            RoomChannel::Move => proto::Channel::Move.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Join,
    Leave,
    Start,
    GameOver,
    Interrupted,
    Chat,
    Stone,
    ServerShutdown,
}

impl MessageKind {
    pub fn to_proto(&self) -> i32 {
        let kind = match self {
            MessageKind::Join => proto::MessageKind::Join,
            MessageKind::Leave => proto::MessageKind::Leave,
            MessageKind::Start => proto::MessageKind::Start,
            MessageKind::GameOver => proto::MessageKind::GameOver,
            MessageKind::Interrupted => proto::MessageKind::Interrupted,
            MessageKind::Chat => proto::MessageKind::Chat,
            MessageKind::Stone => proto::MessageKind::Stone,
            MessageKind::ServerShutdown => proto::MessageKind::ServerShutdown,
        };
        kind.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMessage {
    pub kind: MessageKind,
    pub sender: String,
    pub sender_id: String,
    pub content: String,
    pub row: i32,
    pub col: i32,
    pub stone_type: StoneType,
    pub skin_url: Option<String>,
}

impl GameMessage {
    pub fn new(kind: MessageKind, sender: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            kind,
            sender: sender.into(),
            sender_id: sender_id.into(),
            content: String::new(),
            row: 0,
            col: 0,
            stone_type: StoneType::Empty,
            skin_url: None,
        }
    }

    pub fn system(kind: MessageKind, content: impl Into<String>) -> Self {
        Self::new(kind, SYSTEM_SENDER, "").with_content(content)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_stone(mut self, stone_type: StoneType) -> Self {
        self.stone_type = stone_type;
        self
    }

    pub fn with_position(mut self, row: i32, col: i32) -> Self {
        self.row = row;
        self.col = col;
        self
    }

    /// Game-over notices carry the winner's id in `sender_id`.
    pub fn with_winner(mut self, winner_id: &ParticipantId) -> Self {
        self.sender_id = winner_id.to_string();
        self
    }

    pub fn with_skin(mut self, skin_url: Option<String>) -> Self {
        self.skin_url = skin_url;
        self
    }

    pub fn to_proto(&self) -> proto::GameMessage {
        proto::GameMessage {
            kind: self.kind.to_proto(),
            sender: self.sender.clone(),
            sender_id: self.sender_id.clone(),
            content: self.content.clone(),
            row: self.row,
            col: self.col,
            stone_type: self.stone_type.to_proto(),
            skin_url: self.skin_url.clone().unwrap_or_default(),
        }
    }

    pub fn to_server_message(&self, room_id: Option<&RoomId>, channel: RoomChannel) -> proto::ServerMessage {
        proto::ServerMessage {
            room_id: room_id.map(|id| id.to_string()).unwrap_or_default(),
            channel: channel.to_proto(),
            message: Some(self.to_proto()),
        }
    }
}

/// A message addressed to one of the room's channels, built under the room lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomBroadcast {
    pub channel: RoomChannel,
    pub message: GameMessage,
}

impl RoomBroadcast {
    pub fn chat(message: GameMessage) -> Self {
        Self {
            channel: RoomChannel::Chat,
            message,
        }
    }

    pub fn moves(message: GameMessage) -> Self {
        Self {
            channel: RoomChannel::Move,
            message,
        }
    }
}
