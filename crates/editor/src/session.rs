//! The open document: its block list and the autosave that flushes it.
//!
//! [`DocumentSession`] is the single owner of the in-memory blocks while a
//! document is open. Edits land in that shared list (see
//! [`update_block_content`](DocumentSession::update_block_content)) and are
//! followed by [`on_block_changed`](DocumentSession::on_block_changed), which
//! drives the [`Autosave`] machine: the first change schedules one flush
//! after the autosave delay, later changes coalesce into it.
//!
//! A flush sends every block to the server one request at a time and then
//! commits the document. There is never more than one save request in
//! flight: flushes, document switches and rollbacks serialize on one lock.
//!
//! Timer policy: a pending flush is cancelled by a manual flush (which
//! covers it), by a rollback (which supersedes local edits) and by switching
//! documents, which flushes the old document first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use wikidocs_client::WikiApi;
use wikidocs_core::autosave::{Autosave, AutosaveState, Transition};
use wikidocs_core::block::{has_unique_positions, order_by_position, Block, BlockKind};
use wikidocs_core::types::ObjectId;

use crate::error::{EditorError, EditorResult};
use crate::events::SessionEvent;

/// Broadcast channel capacity for session events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct DocumentSession {
    api: Arc<dyn WikiApi>,
    autosave_delay: Duration,
    state: Mutex<SessionState>,
    /// Held for the whole of a flush, a document switch or a rollback.
    flush_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

struct SessionState {
    document_id: Option<ObjectId>,
    blocks: Vec<Block>,
    autosave: Autosave,
    /// Cancels the timer of the scheduled flush, if any.
    pending_timer: Option<CancellationToken>,
}

impl SessionState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            timer.cancel();
        }
    }
}

impl DocumentSession {
    /// An empty session with no document open. Edits are flushed
    /// `autosave_delay` after the first unsaved change.
    pub fn new(api: Arc<dyn WikiApi>, autosave_delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            autosave_delay,
            state: Mutex::new(SessionState {
                document_id: None,
                blocks: Vec::new(),
                autosave: Autosave::new(),
                pending_timer: None,
            }),
            flush_lock: Mutex::new(()),
            events,
        })
    }

    /// The client every request of this session goes through.
    pub fn api(&self) -> &Arc<dyn WikiApi> {
        &self.api
    }

    pub fn autosave_delay(&self) -> Duration {
        self.autosave_delay
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    // ---- read accessors ----

    pub async fn document_id(&self) -> Option<ObjectId> {
        self.state.lock().await.document_id
    }

    /// Snapshot of the in-memory blocks, in position order.
    pub async fn blocks(&self) -> Vec<Block> {
        self.state.lock().await.blocks.clone()
    }

    pub async fn block(&self, block_id: ObjectId) -> Option<Block> {
        self.state
            .lock()
            .await
            .blocks
            .iter()
            .find(|b| b.id == block_id)
            .cloned()
    }

    pub async fn is_dirty(&self) -> bool {
        self.state.lock().await.autosave.is_dirty()
    }

    pub async fn autosave_state(&self) -> AutosaveState {
        self.state.lock().await.autosave.state()
    }

    async fn require_document(&self) -> EditorResult<ObjectId> {
        self.document_id().await.ok_or(EditorError::NoDocument)
    }

    // ---- loading ----

    /// Open `document_id`, replacing the in-memory list with the server's.
    ///
    /// The list is emptied before the fetch starts, so observers see a
    /// transient empty document. Unsaved edits of the previously open
    /// document are flushed first, including edits made while that flush
    /// was in flight; if a flush fails the error is logged and the switch
    /// goes ahead.
    pub async fn load_document(self: &Arc<Self>, document_id: ObjectId) -> EditorResult<()> {
        let _flush = self.flush_lock.lock().await;

        if let Some(previous) = self.dirty_document().await {
            tracing::info!(document_id = %previous, "Flushing unsaved edits before switching documents");
        }
        let (mut st, settled) = self.settle_locked().await;
        if let (Err(e), Some(previous)) = (settled, st.document_id) {
            tracing::error!(document_id = %previous, error = %e, "Unsaved edits could not be flushed, switching anyway");
        }
        st.autosave.reset();
        st.cancel_timer();
        st.document_id = Some(document_id);
        st.blocks.clear();
        drop(st);
        self.emit(SessionEvent::Cleared { document_id });

        match self.fetch_blocks(document_id).await {
            Ok(blocks) => {
                let block_count = blocks.len();
                self.state.lock().await.blocks = blocks;
                tracing::info!(%document_id, block_count, "Document loaded");
                self.emit(SessionEvent::Loaded {
                    document_id,
                    block_count,
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!(%document_id, error = %e, "Failed to load document blocks");
                self.emit(SessionEvent::LoadFailed {
                    document_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_blocks(&self, document_id: ObjectId) -> EditorResult<Vec<Block>> {
        let mut blocks = self.api.get_blocks(document_id).await?;
        order_by_position(&mut blocks);
        if !has_unique_positions(&blocks) {
            tracing::warn!(%document_id, "Document has blocks sharing a position");
        }
        Ok(blocks)
    }

    /// Replace the list with a fresh server copy after a structural change.
    ///
    /// While the document is dirty, blocks that still exist keep their local
    /// content: it is newer than the server's and will go out with the next
    /// flush.
    async fn reload(&self, document_id: ObjectId) -> EditorResult<()> {
        let mut fresh = self.fetch_blocks(document_id).await?;
        let mut st = self.state.lock().await;
        if st.document_id != Some(document_id) {
            return Ok(());
        }
        if st.autosave.is_dirty() {
            for block in fresh.iter_mut() {
                if let Some(local) = st.blocks.iter().find(|b| b.id == block.id) {
                    block.content = local.content.clone();
                }
            }
        }
        let block_count = fresh.len();
        st.blocks = fresh;
        drop(st);
        self.emit(SessionEvent::Loaded {
            document_id,
            block_count,
        });
        Ok(())
    }

    // ---- editing ----

    /// Write new content into the shared block list.
    ///
    /// This is the shared state a block editor writes through; it does not
    /// mark the document dirty by itself.
    pub async fn update_block_content(
        &self,
        block_id: ObjectId,
        content: impl Into<String>,
    ) -> EditorResult<Block> {
        let mut st = self.state.lock().await;
        let block = st
            .blocks
            .iter_mut()
            .find(|b| b.id == block_id)
            .ok_or(EditorError::BlockNotFound(block_id))?;
        block.content = content.into();
        Ok(block.clone())
    }

    /// Something in the document changed. Schedules a flush unless one is
    /// already pending or running.
    pub async fn on_block_changed(self: &Arc<Self>) {
        let mut st = self.state.lock().await;
        if st.document_id.is_none() {
            tracing::debug!("Change notification without an open document ignored");
            return;
        }
        match st.autosave.mark_dirty() {
            Transition::Schedule { generation } => {
                self.arm_timer(&mut st, generation);
                drop(st);
                self.emit(SessionEvent::FlushScheduled { generation });
            }
            Transition::Coalesced => {
                tracing::trace!("Change coalesced into pending flush");
            }
            Transition::Settled => {}
        }
    }

    fn arm_timer(self: &Arc<Self>, st: &mut SessionState, generation: u64) {
        st.cancel_timer();
        let cancel = CancellationToken::new();
        st.pending_timer = Some(cancel.clone());

        let session = Arc::downgrade(self);
        let delay = self.autosave_delay;
        tracing::debug!(generation, ?delay, "Flush scheduled");

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(session) = session.upgrade() {
                        session.on_timer(generation).await;
                    }
                }
            }
        });
    }

    async fn on_timer(self: &Arc<Self>, generation: u64) {
        let _flush = self.flush_lock.lock().await;
        if !self.state.lock().await.autosave.timer_fired(generation) {
            tracing::debug!(generation, "Stale flush timer ignored");
            return;
        }
        // A failure is logged and announced by the flush itself.
        let _ = self.flush_locked().await;
    }

    // ---- saving ----

    /// Send every in-memory block to the server, then commit the document.
    ///
    /// Also serves as the manual save: a pending scheduled flush is cancelled
    /// because this one covers it. Requests go out strictly one after the
    /// other. If one fails the remaining blocks are not sent, blocks already
    /// sent stay saved, the document stays dirty and the error is returned.
    pub async fn flush(self: &Arc<Self>) -> EditorResult<()> {
        let _flush = self.flush_lock.lock().await;
        self.flush_locked().await
    }

    /// The save button: flush now, whether or not anything is pending.
    pub async fn save_now(self: &Arc<Self>) -> EditorResult<()> {
        tracing::debug!("Manual save requested");
        self.flush().await
    }

    /// Body of [`flush`](Self::flush); the caller holds `flush_lock`.
    async fn flush_locked(self: &Arc<Self>) -> EditorResult<()> {
        let (document_id, snapshot) = {
            let mut st = self.state.lock().await;
            let document_id = st.document_id.ok_or(EditorError::NoDocument)?;
            if st.autosave.begin_flush().is_some() {
                st.cancel_timer();
            }
            (document_id, st.blocks.clone())
        };

        self.emit(SessionEvent::FlushStarted {
            document_id,
            block_count: snapshot.len(),
        });
        let result = self.send_blocks(document_id, &snapshot).await;

        let mut st = self.state.lock().await;
        match result {
            Ok(()) => {
                if let Transition::Schedule { generation } = st.autosave.flush_succeeded() {
                    self.arm_timer(&mut st, generation);
                    drop(st);
                    self.emit(SessionEvent::FlushScheduled { generation });
                } else {
                    drop(st);
                }
                tracing::info!(%document_id, blocks = snapshot.len(), "Document saved");
                self.emit(SessionEvent::Saved { document_id });
                Ok(())
            }
            Err(e) => {
                st.autosave.flush_failed();
                drop(st);
                tracing::error!(%document_id, error = %e, "Document save failed");
                self.emit(SessionEvent::SaveFailed {
                    document_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn send_blocks(&self, document_id: ObjectId, blocks: &[Block]) -> EditorResult<()> {
        for block in blocks {
            if block.kind == BlockKind::Unsupported {
                tracing::debug!(block_id = %block.id, "Skipping block of unsupported kind");
                continue;
            }
            self.api
                .update_block_data(block.id, block.kind, &block.content)
                .await?;
        }
        self.api.save_document(document_id).await?;
        Ok(())
    }

    // ---- structure ----

    /// Create a block on the server at `position`, reload the list and mark
    /// the document dirty. The new block only appears once the server has
    /// assigned its id.
    pub async fn add_block(self: &Arc<Self>, position: i32, kind: BlockKind) -> EditorResult<()> {
        let document_id = self.require_document().await?;
        self.api.add_block(document_id, position, kind).await?;
        tracing::info!(%document_id, position, %kind, "Block added");
        self.reload(document_id).await?;
        self.on_block_changed().await;
        Ok(())
    }

    /// Delete a block on the server and reload the list.
    pub async fn delete_block(&self, block_id: ObjectId) -> EditorResult<()> {
        let document_id = self.require_document().await?;
        self.api.delete_block(block_id).await?;
        tracing::info!(%document_id, %block_id, "Block deleted");
        self.reload(document_id).await
    }

    /// Make the open document publicly visible.
    pub async fn publish(&self) -> EditorResult<()> {
        let document_id = self.require_document().await?;
        self.api.publish_document(document_id).await?;
        tracing::info!(%document_id, "Document published");
        Ok(())
    }

    /// Restore the whole document to `commit_id`. Local unsaved edits are
    /// discarded; the list becomes the server's restored blocks.
    pub async fn rollback_document(&self, commit_id: &str) -> EditorResult<()> {
        let _flush = self.flush_lock.lock().await;
        let document_id = self.require_document().await?;
        let mut blocks = self.api.rollback_document(document_id, commit_id).await?;
        order_by_position(&mut blocks);

        let block_count = blocks.len();
        {
            let mut st = self.state.lock().await;
            if st.document_id != Some(document_id) {
                return Ok(());
            }
            st.autosave.reset();
            st.cancel_timer();
            st.blocks = blocks;
        }
        tracing::info!(%document_id, commit_id, "Document rolled back");
        self.emit(SessionEvent::Loaded {
            document_id,
            block_count,
        });
        Ok(())
    }

    /// Flush outstanding edits, including any made while the flush runs.
    ///
    /// On success the document is clean and no timer is left armed. On
    /// failure it stays [`Dirty`](AutosaveState::Dirty) with nothing
    /// scheduled and the error is returned; the session remains usable.
    pub async fn close(self: &Arc<Self>) -> EditorResult<()> {
        let _flush = self.flush_lock.lock().await;
        let (mut st, result) = self.settle_locked().await;
        st.cancel_timer();
        result
    }

    async fn dirty_document(&self) -> Option<ObjectId> {
        let st = self.state.lock().await;
        st.document_id.filter(|_| st.autosave.is_dirty())
    }

    /// Flush until nothing is outstanding; the caller holds `flush_lock`.
    ///
    /// An edit that lands during a flush schedules another one, so a single
    /// pass can leave the document dirty. Stops at the first failure. The
    /// state lock is returned held, so no edit can slip in between the
    /// final check and whatever the caller does next.
    async fn settle_locked(
        self: &Arc<Self>,
    ) -> (MutexGuard<'_, SessionState>, EditorResult<()>) {
        let mut result = Ok(());
        loop {
            let st = self.state.lock().await;
            if result.is_err() || st.document_id.is_none() || !st.autosave.is_dirty() {
                return (st, result);
            }
            drop(st);
            result = self.flush_locked().await;
        }
    }
}
