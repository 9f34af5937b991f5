//! Concurrent batch verification of header sequences.
//!
//! A bounded worker pool picks header indices off a rendezvous channel while
//! a dispatcher thread reorders completions and emits one result per header,
//! strictly in input order, regardless of worker completion order.

use crate::{
    engine::{Aquahash, PowMode},
    validation,
};
use aqua_interfaces::{ChainReader, ConsensusError};
use aqua_primitives::Header;
use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use std::{sync::Arc, thread};
use tracing::{debug, trace};

/// Cancels an in-flight [`Aquahash::verify_headers`] batch.
///
/// Dropping the handle without calling [`abort`](Self::abort) lets the batch
/// run to completion.
#[derive(Debug)]
pub struct AbortHandle {
    tx: Sender<()>,
}

impl AbortHandle {
    /// Stops the batch: no further results are emitted and all workers wind
    /// down. Results already emitted remain valid.
    pub fn abort(&self) {
        let _ = self.tx.try_send(());
    }
}

impl Aquahash {
    /// Verifies a batch of headers concurrently, emitting one result per
    /// header in input order. `seals[i]` selects whether header `i` gets a
    /// seal check.
    ///
    /// Returns a handle to cancel the run and the ordered result stream.
    pub fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (AbortHandle, Receiver<Result<(), ConsensusError>>) {
        let count = headers.len();
        let (abort_tx, abort_rx) = bounded(1);
        let (results_tx, results_rx) = bounded(count);

        // a full fake (or an empty batch) resolves immediately
        if self.config.pow_mode == PowMode::FullFake || count == 0 {
            for _ in 0..count {
                let _ = results_tx.send(Ok(()));
            }
            return (AbortHandle { tx: abort_tx }, results_rx)
        }

        let workers = thread::available_parallelism().map(usize::from).unwrap_or(1).min(count);
        debug!(target: "consensus", count, workers, "verifying header batch");

        let (input_tx, input_rx) = bounded::<usize>(0);
        let (done_tx, done_rx) = bounded::<(usize, Result<(), ConsensusError>)>(workers);
        let headers = Arc::new(headers);
        let seals = Arc::new(seals);

        for _ in 0..workers {
            let engine = self.clone();
            let chain = Arc::clone(&chain);
            let headers = Arc::clone(&headers);
            let seals = Arc::clone(&seals);
            let input_rx = input_rx.clone();
            let done_tx = done_tx.clone();
            thread::spawn(move || {
                for index in input_rx {
                    let result = verify_worker(&engine, &*chain, &headers, &seals, index);
                    if done_tx.send((index, result)).is_err() {
                        return
                    }
                }
            });
        }

        thread::spawn(move || {
            let mut results: Vec<Option<Result<(), ConsensusError>>> = vec![None; count];
            let mut abort_rx = abort_rx;
            let mut out = 0;

            // feed indices to the workers while draining completions
            let mut next = 0;
            while next < count {
                select! {
                    send(input_tx, next) -> sent => {
                        if sent.is_err() {
                            return
                        }
                        next += 1;
                    }
                    recv(done_rx) -> msg => {
                        let Ok((index, result)) = msg else { return };
                        results[index] = Some(result);
                        if !emit_ready(&results, &results_tx, &mut out) {
                            trace!(target: "consensus", "result stream closed, stopping batch");
                            return
                        }
                    }
                    recv(abort_rx) -> msg => {
                        if msg.is_ok() {
                            trace!(target: "consensus", "header batch aborted");
                            return
                        }
                        // the handle was dropped without aborting
                        abort_rx = never();
                    }
                }
            }
            // all indices dispatched: close the input side and drain the rest
            drop(input_tx);
            while out < count {
                select! {
                    recv(done_rx) -> msg => {
                        let Ok((index, result)) = msg else { return };
                        results[index] = Some(result);
                        if !emit_ready(&results, &results_tx, &mut out) {
                            trace!(target: "consensus", "result stream closed, stopping batch");
                            return
                        }
                    }
                    recv(abort_rx) -> msg => {
                        if msg.is_ok() {
                            trace!(target: "consensus", "header batch aborted");
                            return
                        }
                        abort_rx = never();
                    }
                }
            }
        });

        (AbortHandle { tx: abort_tx }, results_rx)
    }
}

/// Emits the contiguous prefix of completed results past the cursor. Returns
/// `false` once the receiving side is gone.
fn emit_ready(
    results: &[Option<Result<(), ConsensusError>>],
    results_tx: &Sender<Result<(), ConsensusError>>,
    out: &mut usize,
) -> bool {
    while *out < results.len() {
        let Some(result) = results[*out].clone() else { break };
        if results_tx.send(result).is_err() {
            return false
        }
        *out += 1;
    }
    true
}

/// Validates one index of the batch, resolving the parent in-batch where the
/// sequence is contiguous.
fn verify_worker(
    engine: &Aquahash,
    chain: &dyn ChainReader,
    headers: &[Header],
    seals: &[bool],
    index: usize,
) -> Result<(), ConsensusError> {
    let header = &headers[index];
    let parent = if index == 0 {
        chain.header(header.parent_hash, header.number.wrapping_sub(1))
    } else {
        // in-batch parents are matched by their version-adjusted identity;
        // the version byte is derived by height, never carried on the wire
        let prev = &headers[index - 1];
        let prev_hash = prev.hash_with_version(chain.config().block_version(prev.number));
        if prev_hash == header.parent_hash {
            Some(prev.clone())
        } else {
            None
        }
    };
    let Some(parent) = parent else {
        return Err(ConsensusError::UnknownAncestor { hash: header.parent_hash })
    };
    // already known under its version-adjusted hash: nothing to validate
    let version = chain.config().block_version(header.number);
    if chain.header(header.hash_with_version(version), header.number).is_some() {
        return Ok(())
    }
    validation::validate_header(engine, chain, header, &parent, false, seals[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{homestead_config, linked_headers, MockChain};
    use aqua_primitives::B256;
    use std::time::Duration;

    fn batch_fixture(count: usize) -> (Arc<MockChain>, Vec<Header>) {
        let config = homestead_config();
        let headers = linked_headers(&config, count + 1);
        let chain = MockChain::new(config).with_header(&headers[0]);
        (Arc::new(chain), headers[1..].to_vec())
    }

    #[test]
    fn results_arrive_in_input_order() {
        let (chain, headers) = batch_fixture(1000);
        // an engine rejecting exactly the seal of header 500
        let engine = Aquahash::fake_failer(headers[500].number);

        let count = headers.len();
        let seals = vec![true; count];
        let (_abort, results) = engine.verify_headers(chain, headers, seals);
        for index in 0..count {
            let result = results.recv_timeout(Duration::from_secs(10)).unwrap();
            if index == 500 {
                assert_eq!(result, Err(ConsensusError::InvalidPoW));
            } else {
                assert_eq!(result, Ok(()), "unexpected failure at index {index}");
            }
        }
    }

    #[test]
    fn post_hf5_batch_links_by_version_adjusted_hashes() {
        let engine = Aquahash::faker();
        let mut config = homestead_config();
        config.hf.insert(5, 0);
        let headers = linked_headers(&config, 9);
        // the chain knows the anchor under its version-adjusted identity
        let mut root = headers[0].clone();
        root.set_version(config.block_version(root.number));
        let chain = Arc::new(MockChain::new(config).with_header(&root));

        // wire headers carry no version byte; in-batch parent links must
        // still resolve under the version-adjusted hashes
        let batch = headers[1..].to_vec();
        let count = batch.len();
        let seals = vec![false; count];
        let (_abort, results) = engine.verify_headers(chain, batch, seals);
        for index in 0..count {
            assert_eq!(
                results.recv_timeout(Duration::from_secs(10)).unwrap(),
                Ok(()),
                "unexpected failure at index {index}",
            );
        }
    }

    #[test]
    fn missing_parent_fails_only_the_detached_header() {
        let engine = Aquahash::faker();
        let (chain, mut headers) = batch_fixture(5);
        let detached = B256::repeat_byte(0xdd);
        headers[3].parent_hash = detached;
        // keep the suffix chained onto the detached header
        headers[4].parent_hash = headers[3].hash();

        let seals = vec![false; headers.len()];
        let (_abort, results) = engine.verify_headers(chain, headers, seals);
        let collected: Vec<_> = (0..5)
            .map(|_| results.recv_timeout(Duration::from_secs(10)).unwrap())
            .collect();
        assert_eq!(collected[2], Ok(()));
        assert_eq!(collected[3], Err(ConsensusError::UnknownAncestor { hash: detached }));
        // the next header resolves its parent in-batch
        assert_eq!(collected[4], Ok(()));
    }

    #[test]
    fn known_headers_short_circuit() {
        let engine = Aquahash::faker();
        let config = homestead_config();
        let headers = linked_headers(&config, 3);
        let mut chain = MockChain::new(config);
        for header in &headers {
            chain.insert_header(header.clone());
        }
        // corrupt a field that full validation would reject, and record the
        // corrupted header as already known; the short circuit must accept it
        let mut batch = headers[1..].to_vec();
        batch[1].gas_used = batch[1].gas_limit + 1;
        chain.insert_header(batch[1].clone());

        let seals = vec![false; batch.len()];
        let (_abort, results) = engine.verify_headers(Arc::new(chain), batch, seals);
        assert_eq!(results.recv_timeout(Duration::from_secs(10)).unwrap(), Ok(()));
        assert_eq!(results.recv_timeout(Duration::from_secs(10)).unwrap(), Ok(()));
    }

    #[test]
    fn full_fake_resolves_everything_immediately() {
        let engine = Aquahash::full_faker();
        let (chain, headers) = batch_fixture(4);
        let seals = vec![true; headers.len()];
        let (_abort, results) = engine.verify_headers(chain, headers, seals);
        for _ in 0..4 {
            assert_eq!(results.recv_timeout(Duration::from_secs(1)).unwrap(), Ok(()));
        }
    }

    #[test]
    fn empty_batch_yields_an_empty_stream() {
        let engine = Aquahash::faker();
        let (chain, _) = batch_fixture(1);
        let (_abort, results) = engine.verify_headers(chain, Vec::new(), Vec::new());
        assert!(results.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn abort_stops_the_stream() {
        // slow every seal down so the batch outlives the abort
        let engine = Aquahash::fake_delayer(Duration::from_millis(20));
        let (chain, headers) = batch_fixture(64);
        let seals = vec![true; headers.len()];
        let (abort, results) = engine.verify_headers(chain, headers, seals);
        abort.abort();
        // drain whatever was emitted before the abort; the stream must end
        // long before all 64 results could have been produced
        let mut emitted = 0;
        while results.recv_timeout(Duration::from_millis(500)).is_ok() {
            emitted += 1;
        }
        assert!(emitted < 64, "abort did not stop the stream");
    }
}
