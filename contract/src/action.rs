//! Request and response shapes.
//!
//! Actions are tagged by their on-ledger names, e.g.
//! `{"principal":"alice","action":"answerpoll","account":"alice","poll_id":1,"choice":0}`.

use lumeos_store::{Account, Poll};
use lumeos_polls::PollDraft;
use lumeos_types::{AccountName, Asset, ContentHash, DateOfBirth, PollId, Profile};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    #[serde(rename = "createuser")]
    CreateUser {
        account: AccountName,
        profile: Profile,
        #[serde(default)]
        content_hash: Option<ContentHash>,
    },
    /// Replace the account's content hash.
    #[serde(rename = "updateuser")]
    UpdateUser {
        account: AccountName,
        content_hash: ContentHash,
    },
    #[serde(rename = "removeuser")]
    RemoveUser {
        account: AccountName,
        #[serde(default)]
        reason: String,
    },
    #[serde(rename = "getuser")]
    GetUser { account: AccountName },
    #[serde(rename = "setemail")]
    SetEmail { account: AccountName, email: String },
    #[serde(rename = "setname")]
    SetName { account: AccountName, name: String },
    #[serde(rename = "setdob")]
    SetDateOfBirth {
        account: AccountName,
        date_of_birth: DateOfBirth,
    },
    /// `address` is `street:city:country:postal_code`.
    #[serde(rename = "setaddress")]
    SetAddress { account: AccountName, address: String },
    #[serde(rename = "updateflist")]
    UpdateFriendList {
        account: AccountName,
        friend: AccountName,
        #[serde(default = "default_connect")]
        connect: bool,
    },
    #[serde(rename = "createpoll")]
    CreatePoll {
        account: AccountName,
        #[serde(flatten)]
        poll: PollDraft,
    },
    #[serde(rename = "updatepoll")]
    UpdatePoll {
        account: AccountName,
        poll_id: PollId,
        #[serde(default)]
        price: Option<Asset>,
        #[serde(default)]
        content_hash: Option<ContentHash>,
    },
    #[serde(rename = "removepoll")]
    RemovePoll { account: AccountName, poll_id: PollId },
    #[serde(rename = "answerpoll")]
    AnswerPoll {
        account: AccountName,
        poll_id: PollId,
        choice: u8,
    },
    #[serde(rename = "searchpoll")]
    SearchPoll { tag: String },
    #[serde(rename = "buy")]
    Buy { account: AccountName, poll_id: PollId },
}

fn default_connect() -> bool {
    true
}

impl Action {
    /// On-ledger action name.
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateUser { .. } => "createuser",
            Action::UpdateUser { .. } => "updateuser",
            Action::RemoveUser { .. } => "removeuser",
            Action::GetUser { .. } => "getuser",
            Action::SetEmail { .. } => "setemail",
            Action::SetName { .. } => "setname",
            Action::SetDateOfBirth { .. } => "setdob",
            Action::SetAddress { .. } => "setaddress",
            Action::UpdateFriendList { .. } => "updateflist",
            Action::CreatePoll { .. } => "createpoll",
            Action::UpdatePoll { .. } => "updatepoll",
            Action::RemovePoll { .. } => "removepoll",
            Action::AnswerPoll { .. } => "answerpoll",
            Action::SearchPoll { .. } => "searchpoll",
            Action::Buy { .. } => "buy",
        }
    }

    /// Whether the action can change stored state.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::GetUser { .. } | Action::SearchPoll { .. })
    }
}

/// One invocation: the authenticated principal and what it asks for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub principal: AccountName,
    #[serde(flatten)]
    pub action: Action,
}

impl Request {
    pub fn new(principal: AccountName, action: Action) -> Self {
        Self { principal, action }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Account(Account),
    PollCreated(PollId),
    Polls(Vec<Poll>),
}
