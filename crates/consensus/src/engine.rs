use crate::{
    difficulty, reward, seal, validation,
    pow::{EpochCaches, TestCaches},
};
use aqua_interfaces::{ChainReader, Consensus, ConsensusError, StateWriter};
use aqua_primitives::{Address, Block, Header, Receipt, Transaction, U256};
use once_cell::sync::Lazy;
use std::{fmt, sync::Arc, time::Duration};

/// How the engine treats proof-of-work seals. Only verification paths are
/// affected; difficulty calculation and finalization are mode-independent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PowMode {
    /// Full verification against the epoch dataset.
    #[default]
    Normal,
    /// Delegate seal verification to the process-wide shared engine.
    Shared,
    /// Full verification over the small test dataset.
    Test,
    /// Accept every seal after an optional delay, optionally failing at one
    /// pinned height.
    Fake,
    /// Accept every verification unconditionally.
    FullFake,
}

/// Engine configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct AquahashConfig {
    /// Seal verification mode.
    pub pow_mode: PowMode,
}

/// Process-wide engine backing every [`Aquahash::shared`] instance.
static SHARED: Lazy<Aquahash> = Lazy::new(Aquahash::tester);

/// The proof-of-work consensus engine.
///
/// Cheap to clone: the epoch cache provider is shared behind an `Arc`, which
/// is what lets the batch verifier fan a single engine out across worker
/// threads.
#[derive(Clone)]
pub struct Aquahash {
    pub(crate) config: AquahashConfig,
    pub(crate) caches: Arc<dyn EpochCaches>,
    pub(crate) fake_fail: Option<u64>,
    pub(crate) fake_delay: Duration,
    pub(crate) shared: Option<&'static Aquahash>,
}

impl Aquahash {
    /// Creates an engine verifying against caches from the given provider.
    pub fn new(config: AquahashConfig, caches: Arc<dyn EpochCaches>) -> Self {
        Self { config, caches, fake_fail: None, fake_delay: Duration::ZERO, shared: None }
    }

    /// An engine verifying over the small test dataset.
    pub fn tester() -> Self {
        Self::new(AquahashConfig { pow_mode: PowMode::Test }, Arc::new(TestCaches::new()))
    }

    /// An engine that accepts every seal, for testing the rest of the header
    /// rules.
    pub fn faker() -> Self {
        Self { config: AquahashConfig { pow_mode: PowMode::Fake }, ..Self::tester() }
    }

    /// A fake engine that rejects the seal of the block at `fail`.
    pub fn fake_failer(fail: u64) -> Self {
        Self { fake_fail: Some(fail), ..Self::faker() }
    }

    /// A fake engine that sleeps `delay` before accepting a seal.
    pub fn fake_delayer(delay: Duration) -> Self {
        Self { fake_delay: delay, ..Self::faker() }
    }

    /// An engine that accepts every verification unconditionally.
    pub fn full_faker() -> Self {
        Self { config: AquahashConfig { pow_mode: PowMode::FullFake }, ..Self::tester() }
    }

    /// An engine delegating seal verification to the process-wide shared
    /// instance.
    pub fn shared() -> Self {
        Self {
            config: AquahashConfig { pow_mode: PowMode::Shared },
            shared: Some(&SHARED),
            ..Self::tester()
        }
    }

    /// The engine's pow mode.
    pub fn pow_mode(&self) -> PowMode {
        self.config.pow_mode
    }
}

impl fmt::Debug for Aquahash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aquahash")
            .field("config", &self.config)
            .field("fake_fail", &self.fake_fail)
            .field("fake_delay", &self.fake_delay)
            .finish_non_exhaustive()
    }
}

impl Consensus for Aquahash {
    fn author(&self, header: &Header) -> Address {
        header.beneficiary
    }

    fn verify_header(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
        seal: bool,
    ) -> Result<(), ConsensusError> {
        // a full fake accepts any input as valid
        if self.config.pow_mode == PowMode::FullFake {
            return Ok(())
        }
        // short circuit if the header is known, or its parent is not
        let number = header.number;
        if chain.header(header.hash(), number).is_some() {
            return Ok(())
        }
        let parent = chain
            .header(header.parent_hash, number.wrapping_sub(1))
            .ok_or(ConsensusError::UnknownAncestor { hash: header.parent_hash })?;
        validation::validate_header(self, chain, header, &parent, false, seal)
    }

    fn verify_uncles(
        &self,
        chain: &dyn ChainReader,
        block: &Block,
    ) -> Result<(), ConsensusError> {
        if self.config.pow_mode == PowMode::FullFake {
            return Ok(())
        }
        validation::validate_ommers(self, chain, block)
    }

    fn verify_seal(
        &self,
        chain: &dyn ChainReader,
        header: &Header,
    ) -> Result<(), ConsensusError> {
        seal::verify_seal(self, chain, header)
    }

    fn calc_difficulty(&self, chain: &dyn ChainReader, timestamp: u64, parent: &Header) -> U256 {
        difficulty::calc_difficulty(chain.config(), timestamp, parent)
    }

    fn prepare(
        &self,
        chain: &dyn ChainReader,
        header: &mut Header,
    ) -> Result<(), ConsensusError> {
        let parent = chain
            .header(header.parent_hash, header.number.wrapping_sub(1))
            .ok_or(ConsensusError::UnknownAncestor { hash: header.parent_hash })?;
        header.difficulty = difficulty::calc_difficulty(
            chain.config(),
            header.timestamp.wrapping_to::<u64>(),
            &parent,
        );
        Ok(())
    }

    fn finalize(
        &self,
        chain: &dyn ChainReader,
        mut header: Header,
        state: &mut dyn StateWriter,
        body: Vec<Transaction>,
        mut ommers: Vec<Header>,
        receipts: Vec<Receipt>,
    ) -> Block {
        // stamp the block version and propagate it to the uncles
        let version = chain.config().block_version(header.number);
        header.set_version(version);
        for ommer in &mut ommers {
            ommer.version = version;
        }
        reward::accumulate_rewards(state, &header, &ommers);
        header.state_root = state.intermediate_root(chain.config().is_eip158(header.number));
        Block::new(header, body, ommers, receipts)
    }
}
