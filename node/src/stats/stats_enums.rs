use serde::Serialize;
use serde_variant::to_variant_name;

/// Primary statistics type
#[repr(u8)]
#[derive(FromPrimitive, Serialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Error,
    Ledger,
    Rollback,
    Vote,
    Election,
    ElectionVote,
    ActiveElections,
    ConfirmationHeight,
    ConfirmingSet,
    Aggregator,
    Requests,
    VoteGenerator,
    VoteCache,
    Blockprocessor,
    BlockprocessorSource,
    BlockprocessorResult,
    Unchecked,
    Message,
    Drop,
}

impl StatType {
    pub fn as_str(&self) -> &'static str {
        to_variant_name(self).unwrap_or_default()
    }
}

/// Optional detail type
#[repr(u8)]
#[derive(FromPrimitive, Serialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[serde(rename_all = "snake_case")]
pub enum DetailType {
    // common
    All = 0,
    Unknown,
    Loop,
    Total,
    Process,
    Processed,
    Insert,
    Duplicate,
    Overfill,
    Erase,

    // processing queue sources
    Live,
    Local,
    Forced,

    // block processing results
    Progress,
    Old,
    BadSignature,
    NegativeSpend,
    Unreceivable,
    Fork,
    OpenedBurnAccount,
    BalanceMismatch,
    RepresentativeMismatch,
    BlockPosition,
    GapPrevious,
    GapSource,
    GapEpochOpenPending,
    InsufficientWork,

    // block types
    Send,
    Receive,
    Open,
    Change,
    StateBlock,
    EpochBlock,

    // block processor
    Rollback,
    RollbackFailed,
    Put,
    Satisfied,
    Trim,

    // vote results
    Vote,
    Replay,
    Indeterminate,
    Ignored,
    Invalid,
    VoteNew,
    VoteCached,
    Cache,
    Rebroadcast,

    // election
    ElectionStart,
    ElectionBlockConflict,
    ElectionConfirmed,
    ElectionExpired,
    ConfirmOnce,
    ConfirmOnceFailed,
    GenerateVote,
    GenerateVoteNormal,
    GenerateVoteFinal,
    BroadcastBlock,
    ConfirmationRequest,
    Replaced,

    // active elections
    Confirmed,
    ExpiredConfirmed,
    ExpiredUnconfirmed,
    Cemented,
    ElectionNotRecentlyConfirmed,

    // confirmation height / confirming set
    BlocksConfirmed,
    DependentUnconfirmed,
    AlreadyCemented,
    MissingBlock,
    Cementing,

    // request aggregator
    AggregatorAccepted,
    AggregatorDropped,

    // requests
    RequestsCachedHashes,
    RequestsGeneratedHashes,
    RequestsCachedVotes,
    RequestsGeneratedVotes,
    RequestsCachedLateHashes,
    RequestsCachedLateVotes,
    RequestsCannotVote,
    RequestsUnknown,

    // vote generator
    GeneratorBroadcasts,
    GeneratorReplies,
    GeneratorRepliesDiscarded,
    GeneratorSpacing,

    // messages
    Publish,
    ConfirmReq,
    ConfirmAck,
}

impl DetailType {
    pub fn as_str(&self) -> &'static str {
        to_variant_name(self).unwrap_or_default()
    }
}

/// Direction of the stat. If the direction is irrelevant, use In
#[derive(FromPrimitive, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

#[repr(u8)]
#[derive(FromPrimitive, Serialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    ActiveElectionDuration,
}

impl Sample {
    pub fn as_str(&self) -> &'static str {
        to_variant_name(self).unwrap_or_default()
    }
}
