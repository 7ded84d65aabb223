// ============================================================
// Error messages — surfaced verbatim as user errors
// ============================================================

// ── Configuration ──

pub const ERR_INVALID_STAKE_TOKEN: &str = "invalid stake token identifier";
pub const ERR_INVALID_DEBATING_PERIOD: &str = "debating period must be more than 0";

// ── Deposit registry ──

pub const ERR_INVALID_AMOUNT: &str = "amount must be more than 0";
pub const ERR_WRONG_TOKEN: &str = "only the stake token can be deposited";
pub const ERR_NO_STAKE: &str = "deposit is 0";
pub const ERR_STILL_VOTING: &str = "you are still a voter";

// ── Proposal store ──

pub const ERR_NOT_AUTHORIZED: &str = "not the proposer";
pub const ERR_PROPOSAL_NOT_FOUND: &str = "proposal does not exist";
pub const ERR_EMPTY_ENDPOINT: &str = "call endpoint must not be empty";

// ── Voting engine ──

pub const ERR_VOTING_CLOSED: &str = "voting is over";
pub const ERR_ALREADY_COMMITTED: &str = "already voted or delegated";
pub const ERR_NO_WEIGHT: &str = "voting tokens are 0";
pub const ERR_SELF_DELEGATION: &str = "cannot delegate to yourself";
pub const ERR_TARGET_ALREADY_VOTED: &str = "delegate already voted";

// ── Resolution engine ──

pub const ERR_VOTING_IN_PROGRESS: &str = "voting in progress";
pub const ERR_ALREADY_FINALIZED: &str = "voting is finished";
pub const ERR_NOT_ENOUGH_GAS: &str = "not enough gas to execute the proposal call";
