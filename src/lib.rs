#![no_std]

multiversx_sc::imports!();

pub mod distributed_voting_proxy;
pub mod errors;
pub mod types;

use errors::*;
use types::{CallPayload, CallStatus, Proposal, ProposalStatus};

// ============================================================
// Constants
// ============================================================

/// Gas locked for `call_status_callback`, whatever the target burns.
const CALLBACK_GAS: u64 = 10_000_000;

/// Left to `finishProposal` itself after the call is registered.
const FINISH_GAS_RESERVE: u64 = 5_000_000;

/// Lowest gas an approved call may be forwarded with.
const MIN_CALL_GAS: u64 = 5_000_000;

// ============================================================
// Contract
// ============================================================

#[multiversx_sc::contract]
pub trait DistributedVoting {
    // ========================================================
    // Init / Upgrade
    // ========================================================

    #[init]
    fn init(
        &self,
        proposer: ManagedAddress,
        stake_token: TokenIdentifier,
        minimum_quorum: BigUint,
        debating_period: u64,
    ) {
        require!(
            stake_token.is_valid_esdt_identifier(),
            ERR_INVALID_STAKE_TOKEN
        );
        require!(debating_period > 0, ERR_INVALID_DEBATING_PERIOD);

        self.proposer().set(&proposer);
        self.stake_token().set(&stake_token);
        self.minimum_quorum().set(&minimum_quorum);
        self.debating_period().set(debating_period);
        self.proposal_count().set(0u64);
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: deposit
    // Custody is already transferred when the body runs, so the
    // balance can never be credited ahead of the tokens.
    // ========================================================

    #[endpoint(deposit)]
    #[payable("*")]
    fn deposit(&self) {
        let caller = self.blockchain().get_caller();
        let (token_id, amount) = self.call_value().egld_or_single_fungible_esdt();

        require!(amount > 0u64, ERR_INVALID_AMOUNT);
        require!(
            token_id == EgldOrEsdtTokenIdentifier::esdt(self.stake_token().get()),
            ERR_WRONG_TOKEN
        );

        self.staked_balance(&caller).update(|balance| *balance += &amount);
        self.shift_delegated_weight(&caller, &amount, true);

        self.deposit_event(&caller, &amount);
    }

    // ========================================================
    // ENDPOINT: withdraw
    // Full balance only. Locked while any proposal the caller
    // voted in directly is still unfinished. Delegating never locks.
    // Only the caller's own ballots are walked.
    // ========================================================

    #[endpoint(withdraw)]
    fn withdraw(&self) {
        let caller = self.blockchain().get_caller();
        let stake = self.staked_balance(&caller).get();
        require!(stake > 0u64, ERR_NO_STAKE);
        require!(self.count_open_votes(&caller) == 0, ERR_STILL_VOTING);

        self.staked_balance(&caller).clear();
        self.voted_proposals(&caller).clear();
        self.shift_delegated_weight(&caller, &stake, false);

        let token_id = self.stake_token().get();
        self.send().direct_esdt(&caller, &token_id, 0, &stake);
        self.withdraw_event(&caller, &stake);
    }

    // ========================================================
    // ENDPOINT: addProposal
    // Proposer only. The id is returned and emitted, it is not
    // otherwise known to the caller ahead of time.
    // ========================================================

    #[endpoint(addProposal)]
    fn add_proposal(
        &self,
        recipient: ManagedAddress,
        description: ManagedBuffer,
        endpoint: ManagedBuffer,
        arguments: MultiValueEncoded<ManagedBuffer>,
    ) -> u64 {
        let caller = self.blockchain().get_caller();
        require!(caller == self.proposer().get(), ERR_NOT_AUTHORIZED);
        require!(!endpoint.is_empty(), ERR_EMPTY_ENDPOINT);

        let proposal_id = self.proposal_count().get();
        let created_at = self.blockchain().get_block_timestamp();
        let deadline = created_at + self.debating_period().get();

        let payload = CallPayload {
            endpoint,
            arguments: arguments.to_vec(),
        };

        self.proposal_created_event(proposal_id, &recipient, &payload, &description);

        let proposal = Proposal {
            id: proposal_id,
            recipient,
            payload,
            description,
            created_at,
            deadline,
            votes_for: BigUint::zero(),
            votes_against: BigUint::zero(),
            status: ProposalStatus::Open,
        };

        self.proposals(proposal_id).set(&proposal);
        self.proposal_count().set(proposal_id + 1);

        proposal_id
    }

    // ========================================================
    // ENDPOINT: vote
    // Weight is taken once, now, and folded into the tally.
    // ========================================================

    #[endpoint(vote)]
    fn vote(&self, proposal_id: u64, support: bool) {
        let caller = self.blockchain().get_caller();
        let mut proposal = self.require_proposal(proposal_id);
        self.require_voting_open(&proposal);
        require!(
            !self.is_committed(proposal_id, &caller),
            ERR_ALREADY_COMMITTED
        );

        let weight = self.voting_weight(proposal_id, &caller);
        require!(weight > 0u64, ERR_NO_WEIGHT);

        if support {
            proposal.votes_for += &weight;
        } else {
            proposal.votes_against += &weight;
        }
        self.proposals(proposal_id).set(&proposal);

        self.has_voted(proposal_id, &caller).set(true);
        self.voted_proposals(&caller).push(&proposal_id);

        self.vote_event(proposal_id, &caller, support, &weight);
    }

    // ========================================================
    // ENDPOINT: delegate
    // Hands the caller's stake to `to` for this proposal only.
    // The stake stays withdrawable: deposits and withdrawals made
    // before `to` votes move the weight `to` will cast.
    // ========================================================

    #[endpoint(delegate)]
    fn delegate(&self, proposal_id: u64, to: ManagedAddress) {
        let caller = self.blockchain().get_caller();
        let proposal = self.require_proposal(proposal_id);
        self.require_voting_open(&proposal);

        let stake = self.staked_balance(&caller).get();
        require!(stake > 0u64, ERR_NO_STAKE);
        require!(
            !self.is_committed(proposal_id, &caller),
            ERR_ALREADY_COMMITTED
        );
        require!(to != caller, ERR_SELF_DELEGATION);
        require!(
            !self.has_voted(proposal_id, &to).get(),
            ERR_TARGET_ALREADY_VOTED
        );

        self.delegated_to(proposal_id, &caller).set(&to);
        self.delegators(proposal_id, &to).push(&caller);
        self.received_weight(proposal_id, &to)
            .update(|weight| *weight += &stake);
        self.open_delegations(&caller).push(&proposal_id);

        self.delegate_event(proposal_id, &caller, &to, &stake);
    }

    // ========================================================
    // ENDPOINT: finishProposal
    // Anyone, once the deadline passed. The outcome and the tallies
    // are stored before the outbound call is registered. Voters are
    // unlocked by the finalized status itself.
    // ========================================================

    #[endpoint(finishProposal)]
    fn finish_proposal(&self, proposal_id: u64) {
        let mut proposal = self.require_proposal(proposal_id);

        let now = self.blockchain().get_block_timestamp();
        require!(now >= proposal.deadline, ERR_VOTING_IN_PROGRESS);
        require!(!proposal.status.is_finalized(), ERR_ALREADY_FINALIZED);

        let total_votes = &proposal.votes_for + &proposal.votes_against;
        proposal.status = if total_votes < self.minimum_quorum().get() {
            ProposalStatus::QuorumNotReached
        } else if proposal.votes_for <= proposal.votes_against {
            ProposalStatus::Rejected
        } else {
            ProposalStatus::ApprovedExecuted
        };

        // An underfunded finish must not burn the approved call.
        let call_gas = if proposal.status == ProposalStatus::ApprovedExecuted {
            let call_gas = self
                .blockchain()
                .get_gas_left()
                .saturating_sub(CALLBACK_GAS + FINISH_GAS_RESERVE);
            require!(call_gas >= MIN_CALL_GAS, ERR_NOT_ENOUGH_GAS);
            call_gas
        } else {
            0
        };

        self.proposals(proposal_id).set(&proposal);

        match proposal.status {
            ProposalStatus::QuorumNotReached => {
                self.minimum_quorum_not_reached_event(proposal_id);
            },
            ProposalStatus::Rejected => {
                self.proposal_rejected_event(proposal_id);
            },
            _ => {
                self.call_status(proposal_id).set(CallStatus::Pending);
                self.execute_call(proposal_id, proposal.recipient, proposal.payload, call_gas);
            },
        }
    }

    // ========================================================
    // CALL EXECUTOR
    // Fire, record the outcome in the callback, continue. A failing
    // target never reverts the finalization above, and the callback
    // runs on its own locked gas.
    // ========================================================

    fn execute_call(
        &self,
        proposal_id: u64,
        recipient: ManagedAddress,
        payload: CallPayload<Self::Api>,
        call_gas: u64,
    ) {
        let mut call = self.tx().to(&recipient).raw_call(payload.endpoint);
        for argument in payload.arguments.iter() {
            call = call.argument(&*argument);
        }

        call.gas(call_gas)
            .callback(self.callbacks().call_status_callback(proposal_id))
            .gas_for_callback(CALLBACK_GAS)
            .register_promise();
    }

    /// Touches a single small storage entry, so the locked gas covers it
    /// regardless of how large the proposal record is.
    #[promises_callback]
    fn call_status_callback(
        &self,
        proposal_id: u64,
        #[call_result] result: ManagedAsyncCallResult<MultiValueEncoded<ManagedBuffer>>,
    ) {
        let call_status = match result {
            ManagedAsyncCallResult::Ok(_) => CallStatus::Succeeded,
            ManagedAsyncCallResult::Err(_) => CallStatus::Failed,
        };

        self.call_status(proposal_id).set(call_status);
        self.call_status_event(proposal_id, call_status == CallStatus::Succeeded);
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn require_proposal(&self, proposal_id: u64) -> Proposal<Self::Api> {
        let mapper = self.proposals(proposal_id);
        require!(!mapper.is_empty(), ERR_PROPOSAL_NOT_FOUND);
        mapper.get()
    }

    fn require_voting_open(&self, proposal: &Proposal<Self::Api>) {
        let now = self.blockchain().get_block_timestamp();
        require!(
            proposal.status == ProposalStatus::Open && now < proposal.deadline,
            ERR_VOTING_CLOSED
        );
    }

    fn is_voting_open(&self, proposal_id: u64) -> bool {
        let proposal = self.proposals(proposal_id).get();
        proposal.status == ProposalStatus::Open
            && self.blockchain().get_block_timestamp() < proposal.deadline
    }

    /// An account is either untouched, voted or delegated on a proposal.
    fn is_committed(&self, proposal_id: u64, account: &ManagedAddress) -> bool {
        self.has_voted(proposal_id, account).get()
            || !self.delegated_to(proposal_id, account).is_empty()
    }

    /// Own stake plus the current stake of everyone who delegated
    /// to `account` on this proposal.
    fn voting_weight(&self, proposal_id: u64, account: &ManagedAddress) -> BigUint {
        self.staked_balance(account).get() + self.received_weight(proposal_id, account).get()
    }

    /// Proposals `account` voted in directly that nobody finished yet.
    fn count_open_votes(&self, account: &ManagedAddress) -> u64 {
        let mut count = 0u64;
        for proposal_id in self.voted_proposals(account).iter() {
            if !self.proposals(proposal_id).get().status.is_finalized() {
                count += 1;
            }
        }
        count
    }

    /// Moves `amount` of `account`'s stake in or out of every delegation
    /// it still has pending. Delegations that can no longer be cast
    /// (delegate voted, proposal closed) are dropped from the list.
    fn shift_delegated_weight(&self, account: &ManagedAddress, amount: &BigUint, increase: bool) {
        let mut delegations = self.open_delegations(account);
        let mut index = delegations.len();

        // backwards, so swap_remove only moves entries already visited
        while index > 0 {
            let proposal_id = delegations.get(index);
            let delegate = self.delegated_to(proposal_id, account).get();

            if self.is_voting_open(proposal_id) && !self.has_voted(proposal_id, &delegate).get() {
                self.received_weight(proposal_id, &delegate).update(|weight| {
                    if increase {
                        *weight += amount;
                    } else {
                        *weight -= amount;
                    }
                });
            } else {
                delegations.swap_remove(index);
            }
            index -= 1;
        }
    }

    // ========================================================
    // VIEWS — read-only queries
    // ========================================================

    #[view(getRecipient)]
    fn get_recipient(&self, proposal_id: u64) -> ManagedAddress {
        self.require_proposal(proposal_id).recipient
    }

    #[view(getPayload)]
    fn get_payload(&self, proposal_id: u64) -> CallPayload<Self::Api> {
        self.require_proposal(proposal_id).payload
    }

    #[view(getDescription)]
    fn get_description(&self, proposal_id: u64) -> ManagedBuffer {
        self.require_proposal(proposal_id).description
    }

    #[view(getVotes)]
    fn get_votes(&self, proposal_id: u64, support: bool) -> BigUint {
        let proposal = self.require_proposal(proposal_id);
        if support {
            proposal.votes_for
        } else {
            proposal.votes_against
        }
    }

    #[view(getVotesFor)]
    fn get_votes_for(&self, proposal_id: u64) -> BigUint {
        self.require_proposal(proposal_id).votes_for
    }

    #[view(getVotesAgainst)]
    fn get_votes_against(&self, proposal_id: u64) -> BigUint {
        self.require_proposal(proposal_id).votes_against
    }

    #[view(isFinalized)]
    fn is_finalized(&self, proposal_id: u64) -> bool {
        self.require_proposal(proposal_id).status.is_finalized()
    }

    #[view(getProposalStatus)]
    fn get_proposal_status(&self, proposal_id: u64) -> ProposalStatus {
        self.require_proposal(proposal_id).status
    }

    #[view(getCallStatus)]
    fn get_call_status(&self, proposal_id: u64) -> CallStatus {
        self.require_proposal(proposal_id);
        self.call_status(proposal_id).get()
    }

    #[view(getDeadline)]
    fn get_deadline(&self, proposal_id: u64) -> u64 {
        self.require_proposal(proposal_id).deadline
    }

    #[view(getProposal)]
    fn get_proposal(&self, proposal_id: u64) -> Proposal<Self::Api> {
        self.require_proposal(proposal_id)
    }

    #[view(getProposalCount)]
    fn get_proposal_count(&self) -> u64 {
        self.proposal_count().get()
    }

    #[view(getProposals)]
    fn get_proposals(&self, from: u64, count: u64) -> MultiValueEncoded<Proposal<Self::Api>> {
        let mut result = MultiValueEncoded::new();
        let total = self.proposal_count().get();
        let end = core::cmp::min(from.saturating_add(count), total);

        for proposal_id in from..end {
            result.push(self.proposals(proposal_id).get());
        }
        result
    }

    #[view(getActiveProposals)]
    fn get_active_proposals(&self) -> MultiValueEncoded<Proposal<Self::Api>> {
        let mut result = MultiValueEncoded::new();
        let total = self.proposal_count().get();
        let now = self.blockchain().get_block_timestamp();

        for proposal_id in 0..total {
            let proposal = self.proposals(proposal_id).get();
            if proposal.status == ProposalStatus::Open && now < proposal.deadline {
                result.push(proposal);
            }
        }
        result
    }

    #[view(getStakedBalance)]
    fn get_staked_balance(&self, account: ManagedAddress) -> BigUint {
        self.staked_balance(&account).get()
    }

    #[view(getOpenVoteCount)]
    fn get_open_vote_count(&self, account: ManagedAddress) -> u64 {
        self.count_open_votes(&account)
    }

    #[view(hasVoted)]
    fn has_account_voted(&self, proposal_id: u64, account: ManagedAddress) -> bool {
        self.require_proposal(proposal_id);
        self.has_voted(proposal_id, &account).get()
    }

    #[view(getDelegate)]
    fn get_delegate(&self, proposal_id: u64, account: ManagedAddress) -> OptionalValue<ManagedAddress> {
        self.require_proposal(proposal_id);
        let mapper = self.delegated_to(proposal_id, &account);
        if mapper.is_empty() {
            OptionalValue::None
        } else {
            OptionalValue::Some(mapper.get())
        }
    }

    #[view(getDelegators)]
    fn get_delegators(
        &self,
        proposal_id: u64,
        delegate: ManagedAddress,
    ) -> MultiValueEncoded<ManagedAddress> {
        self.require_proposal(proposal_id);
        let mut result = MultiValueEncoded::new();
        for delegator in self.delegators(proposal_id, &delegate).iter() {
            result.push(delegator);
        }
        result
    }

    /// Weight `vote` would cast for `account` if called now.
    #[view(getVotingWeight)]
    fn get_voting_weight(&self, proposal_id: u64, account: ManagedAddress) -> BigUint {
        self.require_proposal(proposal_id);
        self.voting_weight(proposal_id, &account)
    }

    #[view(getCustodyBalance)]
    fn get_custody_balance(&self) -> BigUint {
        let token_id = self.stake_token().get();
        self.blockchain()
            .get_sc_balance(&EgldOrEsdtTokenIdentifier::esdt(token_id), 0)
    }

    #[view(getContractConfig)]
    fn get_contract_config(&self) -> MultiValue4<ManagedAddress, TokenIdentifier, BigUint, u64> {
        (
            self.proposer().get(),
            self.stake_token().get(),
            self.minimum_quorum().get(),
            self.debating_period().get(),
        )
            .into()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("deposit")]
    fn deposit_event(&self, #[indexed] account: &ManagedAddress, amount: &BigUint);

    #[event("withdraw")]
    fn withdraw_event(&self, #[indexed] account: &ManagedAddress, amount: &BigUint);

    #[event("addProposal")]
    fn proposal_created_event(
        &self,
        #[indexed] proposal_id: u64,
        #[indexed] recipient: &ManagedAddress,
        #[indexed] payload: &CallPayload<Self::Api>,
        description: &ManagedBuffer,
    );

    #[event("vote")]
    fn vote_event(
        &self,
        #[indexed] proposal_id: u64,
        #[indexed] voter: &ManagedAddress,
        #[indexed] support: bool,
        weight: &BigUint,
    );

    #[event("delegate")]
    fn delegate_event(
        &self,
        #[indexed] proposal_id: u64,
        #[indexed] from: &ManagedAddress,
        #[indexed] to: &ManagedAddress,
        weight: &BigUint,
    );

    #[event("minimumQuorumNotReached")]
    fn minimum_quorum_not_reached_event(&self, #[indexed] proposal_id: u64);

    #[event("proposalRejected")]
    fn proposal_rejected_event(&self, #[indexed] proposal_id: u64);

    #[event("callStatus")]
    fn call_status_event(&self, #[indexed] proposal_id: u64, #[indexed] success: bool);

    // ========================================================
    // STORAGE
    // ========================================================

    // ── Configuration ──

    #[storage_mapper("proposer")]
    fn proposer(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("stakeToken")]
    fn stake_token(&self) -> SingleValueMapper<TokenIdentifier>;

    #[storage_mapper("minimumQuorum")]
    fn minimum_quorum(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("debatingPeriod")]
    fn debating_period(&self) -> SingleValueMapper<u64>;

    // ── Deposit registry ──

    #[storage_mapper("stakedBalance")]
    fn staked_balance(&self, account: &ManagedAddress) -> SingleValueMapper<BigUint>;

    /// Proposals voted in directly since the last withdrawal.
    #[storage_mapper("votedProposals")]
    fn voted_proposals(&self, account: &ManagedAddress) -> VecMapper<u64>;

    /// Proposals the account delegated on whose delegate has not voted yet.
    #[storage_mapper("openDelegations")]
    fn open_delegations(&self, account: &ManagedAddress) -> VecMapper<u64>;

    // ── Proposals ──

    #[storage_mapper("proposalCount")]
    fn proposal_count(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("proposals")]
    fn proposals(&self, id: u64) -> SingleValueMapper<Proposal<Self::Api>>;

    #[storage_mapper("callStatus")]
    fn call_status(&self, id: u64) -> SingleValueMapper<CallStatus>;

    // ── Ballots ──

    #[storage_mapper("hasVoted")]
    fn has_voted(&self, proposal_id: u64, account: &ManagedAddress) -> SingleValueMapper<bool>;

    #[storage_mapper("delegatedTo")]
    fn delegated_to(
        &self,
        proposal_id: u64,
        account: &ManagedAddress,
    ) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("delegators")]
    fn delegators(&self, proposal_id: u64, delegate: &ManagedAddress) -> VecMapper<ManagedAddress>;

    /// Sum of the current stake of every pending delegation to `delegate`.
    #[storage_mapper("receivedWeight")]
    fn received_weight(&self, proposal_id: u64, delegate: &ManagedAddress) -> SingleValueMapper<BigUint>;
}
