multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Proposal Status — lifecycle states
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum ProposalStatus {
    /// Debating period running (or elapsed but nobody finished it yet).
    Open,
    /// Combined weight stayed below the minimum quorum. Terminal.
    QuorumNotReached,
    /// Quorum reached but votes for <= votes against. Terminal.
    Rejected,
    /// Quorum reached, majority for. The call was dispatched. Terminal.
    ApprovedExecuted,
}

impl ProposalStatus {
    pub fn is_finalized(&self) -> bool {
        *self != ProposalStatus::Open
    }
}

// ============================================================
// Call Status — outcome of the approved proposal's outbound call
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum CallStatus {
    /// Stored apart from `Proposal` and empty until a call goes out.
    NotIssued,
    /// Dispatched, waiting for the promise callback.
    Pending,
    Succeeded,
    Failed,
}

// ============================================================
// Call Payload — opaque instruction for the target contract
// ============================================================

/// Endpoint name plus raw, already-encoded arguments.
/// Only the call executor looks inside.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct CallPayload<M: ManagedTypeApi> {
    pub endpoint: ManagedBuffer<M>,
    pub arguments: ManagedVec<M, ManagedBuffer<M>>,
}

// ============================================================
// Proposal — one stored record per id
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Proposal<M: ManagedTypeApi> {
    pub id: u64,
    pub recipient: ManagedAddress<M>,
    pub payload: CallPayload<M>,
    pub description: ManagedBuffer<M>,
    pub created_at: u64,
    /// `created_at + debating_period`; voting is allowed strictly before it.
    pub deadline: u64,
    pub votes_for: BigUint<M>,
    pub votes_against: BigUint<M>,
    pub status: ProposalStatus,
}
