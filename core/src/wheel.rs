//! The spin wheel controller.
//!
//! Owns the pool, the visible batch, the rotation and the persisted state,
//! and sequences a spin: commit the batch, plan the landing, animate, resolve
//! the winner from the frozen angle, record it. Front ends drive it by
//! calling [`SpinWheel::frame`] from their render loop.

use std::sync::Arc;

use spinwheel_abi::{
    DesignatedWinner, EntrySet, RawRecord, SpinMode, SpinNumber, SpinResult, WheelError,
    WheelFlags, WheelResult, WheelView,
};
use spinwheel_lib::{
    Clock, RotationPolicy, WheelConfig, WheelRng, klog_debug, klog_error, klog_info, klog_warn,
};

use crate::angle::normalize_degrees;
use crate::animator::{AnimationObserver, FrameOutcome, SpinAnimator};
use crate::batch::{BatchSampler, CommittedBatch};
use crate::entries::EntryPool;
use crate::ledger::{RemovalOutcome, WinnerLedger};
use crate::palette;
use crate::planner::{PlanRequest, SpinPlan, SpinPlanner, resolve_designated};
use crate::resolver::resolve;
use crate::scheduler::{CancelHandle, Scheduler, TimerQueue};
use crate::state::StateStore;

/// Spin number a file's pinned ticket applies to.
pub const PINNED_SPIN: SpinNumber = 1;

/// Notifications for the presentation layer.
pub trait WheelEvents: AnimationObserver {
    fn winner_determined(&mut self, _result: &SpinResult) {}

    fn batch_changed(&mut self, _batch: &CommittedBatch) {}
}

pub struct NoEvents;

impl AnimationObserver for NoEvents {}
impl WheelEvents for NoEvents {}

#[derive(Clone, Debug, PartialEq)]
pub struct SpinStarted {
    pub spin_number: SpinNumber,
    pub mode: SpinMode,
    pub target_rotation: f64,
    pub batch_len: usize,
}

/// State touched by the periodic timers.
struct WheelCore {
    config: WheelConfig,
    pool: EntryPool,
    sampler: BatchSampler,
    rng: WheelRng,
    rotation: f64,
    flags: WheelFlags,
    /// Pool position shown at slot 0 while a fixed spin is pending.
    pending_winner: Option<usize>,
    last_drift_ms: u64,
}

impl WheelCore {
    fn resample(&mut self) {
        self.sampler
            .resample(&self.pool, self.pending_winner, &mut self.rng);
    }

    fn resample_tick(&mut self) {
        if self.flags.may_resample() && self.sampler.needs_sampling(&self.pool) {
            self.resample();
        }
    }

    fn drift_tick(&mut self, now_ms: u64) {
        let delta = now_ms.saturating_sub(self.last_drift_ms);
        self.last_drift_ms = now_ms;
        if !self.flags.is_idle() {
            return;
        }
        let step = self.config.drift_degrees * delta as f64 / self.config.drift_interval_ms as f64;
        self.rotation = normalize_degrees(self.rotation + step);
    }
}

pub struct SpinWheel {
    core: WheelCore,
    timers: TimerQueue<WheelCore>,
    resample_timer: Option<CancelHandle>,
    drift_timer: Option<CancelHandle>,
    planner: SpinPlanner,
    animator: SpinAnimator,
    ledger: WinnerLedger,
    state: StateStore,
    clock: Arc<dyn Clock>,
    events: Box<dyn WheelEvents + Send>,
    sets: Vec<EntrySet>,
    current_set: usize,
    center_image: Option<String>,
    in_flight: Option<SpinNumber>,
    last_result: Option<SpinResult>,
}

impl SpinWheel {
    /// Build a wheel showing the placeholder entries. Persisted results and
    /// removals are loaded from `state`.
    pub fn new(config: WheelConfig, state: StateStore, clock: Arc<dyn Clock>) -> WheelResult<Self> {
        let ledger = WinnerLedger::from_parts(state.winners()?, state.removed_entries()?);
        let center_image = state.center_image()?;
        let now = clock.uptime_ms();

        let core = WheelCore {
            pool: EntryPool::placeholder(),
            sampler: BatchSampler::new(config.batch_size),
            rng: WheelRng::from_option(config.seed),
            rotation: 0.0,
            flags: WheelFlags::empty(),
            pending_winner: None,
            last_drift_ms: now,
            config,
        };

        let mut wheel = Self {
            planner: SpinPlanner::from_config(&core.config),
            animator: SpinAnimator::new(core.config.tick_degrees),
            core,
            timers: TimerQueue::new(),
            resample_timer: None,
            drift_timer: None,
            ledger,
            state,
            clock,
            events: Box::new(NoEvents),
            sets: Vec::new(),
            current_set: 0,
            center_image,
            in_flight: None,
            last_result: None,
        };
        wheel.arm_drift(now);
        wheel.arm_resampler(now);
        wheel.refresh_pending()?;
        wheel.core.resample();
        Ok(wheel)
    }

    pub fn set_events(&mut self, events: Box<dyn WheelEvents + Send>) {
        self.events = events;
    }

    // --- accessors --------------------------------------------------------

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.core.rotation
    }

    #[inline]
    pub fn flags(&self) -> WheelFlags {
        self.core.flags
    }

    #[inline]
    pub fn is_spinning(&self) -> bool {
        self.core.flags.contains(WheelFlags::SPINNING)
    }

    pub fn config(&self) -> &WheelConfig {
        &self.core.config
    }

    pub fn pool(&self) -> &EntryPool {
        &self.core.pool
    }

    pub fn visible_batch(&self) -> &CommittedBatch {
        self.core.sampler.visible()
    }

    /// Pool position currently pinned for a pending fixed spin.
    pub fn pending_winner(&self) -> Option<usize> {
        self.core.pending_winner
    }

    pub fn results(&self) -> &[SpinResult] {
        self.ledger.results()
    }

    pub fn last_result(&self) -> Option<&SpinResult> {
        self.last_result.as_ref()
    }

    pub fn ledger(&self) -> &WinnerLedger {
        &self.ledger
    }

    pub fn spin_count(&self) -> WheelResult<SpinNumber> {
        Ok(self.state.spin_count()?)
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Filename of the set on screen under sequential rotation.
    pub fn current_set_name(&self) -> Option<&str> {
        match self.core.config.rotation {
            RotationPolicy::Sequential => self.sets.get(self.current_set).map(|s| s.filename.as_str()),
            RotationPolicy::Merged => None,
        }
    }

    pub fn view(&self) -> WheelView {
        let batch = self.core.sampler.visible();
        WheelView {
            visible_batch: batch.entries().to_vec(),
            colors: palette::batch_colors(batch.len()),
            rotation: self.core.rotation,
            pointer_color: palette::pointer_color(
                self.core.rotation,
                batch.len(),
                self.core.config.pointer_follows_slice,
            ),
            center_image: self.center_image.clone(),
            flags: self.core.flags,
        }
    }

    // --- timers -----------------------------------------------------------

    fn arm_resampler(&mut self, now_ms: u64) {
        if self.resample_timer.is_some() {
            return;
        }
        let interval = self.core.config.resample_interval_ms;
        let handle = self.timers.schedule_periodic(
            interval,
            now_ms,
            Box::new(|core: &mut WheelCore, _now| core.resample_tick()),
        );
        self.resample_timer = Some(handle);
    }

    fn disarm_resampler(&mut self) {
        if let Some(handle) = self.resample_timer.take() {
            self.timers.cancel(handle);
        }
    }

    fn arm_drift(&mut self, now_ms: u64) {
        if self.drift_timer.is_some() {
            return;
        }
        let interval = self.core.config.drift_interval_ms;
        let handle = self.timers.schedule_periodic(
            interval,
            now_ms,
            Box::new(|core: &mut WheelCore, now| core.drift_tick(now)),
        );
        self.drift_timer = Some(handle);
    }

    // --- entry sets -------------------------------------------------------

    fn ensure_not_spinning(&self) -> WheelResult<()> {
        if self.is_spinning() {
            return Err(WheelError::SpinInProgress);
        }
        Ok(())
    }

    /// Replace the loaded sets. Inactive sets are ignored. Returns the pool
    /// size after removed winners are filtered out.
    pub fn load_entry_sets(&mut self, sets: Vec<EntrySet>) -> WheelResult<usize> {
        self.ensure_not_spinning()?;
        self.sets = sets.into_iter().filter(|s| s.active).collect();
        self.current_set = 0;
        self.reload_pool()?;
        Ok(self.core.pool.len())
    }

    /// Fall back to the placeholder entries, e.g. when storage is unreachable.
    pub fn load_placeholder(&mut self) -> WheelResult<()> {
        self.ensure_not_spinning()?;
        self.sets.clear();
        self.current_set = 0;
        self.reload_pool()
    }

    fn shown_sets(&self) -> Vec<&EntrySet> {
        match self.core.config.rotation {
            RotationPolicy::Merged => self.sets.iter().collect(),
            RotationPolicy::Sequential => self.sets.get(self.current_set).into_iter().collect(),
        }
    }

    fn reload_pool(&mut self) -> WheelResult<()> {
        let (records, image, pinned) = {
            let shown = self.shown_sets();
            let records: Vec<RawRecord> = shown
                .iter()
                .flat_map(|s| s.entries.iter().cloned())
                .collect();
            let image = shown.iter().find_map(|s| s.center_image.clone());
            let pinned = shown.iter().find_map(|s| {
                s.pinned_ticket
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
            });
            (records, image, pinned)
        };

        if self.sets.is_empty() {
            klog_info!("wheel: no entry sets, showing placeholders");
            self.core.pool = EntryPool::placeholder();
        } else {
            self.core.pool = EntryPool::normalize(&records, self.ledger.removed());
            klog_info!(
                "wheel: loaded {} of {} entries",
                self.core.pool.len(),
                records.len()
            );
            if self.core.pool.is_empty() {
                klog_warn!("wheel: every entry has been filtered out");
            }
        }

        self.center_image = match image {
            Some(image) => Some(image),
            None => self.state.center_image()?,
        };
        if !self.sets.is_empty() {
            self.apply_pinned_ticket(pinned.as_deref())?;
        }
        self.refresh_pending()?;
        self.core.resample();
        self.events.batch_changed(self.core.sampler.visible());
        Ok(())
    }

    /// A pinned ticket makes spin #1 a fixed spin on that entry; without one,
    /// spin #1 goes back to random unless it was explicitly set to fixed.
    fn apply_pinned_ticket(&mut self, pinned: Option<&str>) -> WheelResult<()> {
        match pinned {
            Some(ticket) => match self.core.pool.index_of_ticket(ticket) {
                Some(index) => {
                    let name = self
                        .core
                        .pool
                        .get(index)
                        .map(|e| e.name.clone())
                        .unwrap_or_default();
                    self.state.set_spin_mode(PINNED_SPIN, SpinMode::Fixed)?;
                    self.state.designate(
                        PINNED_SPIN,
                        DesignatedWinner {
                            ticket: Some(ticket.to_string()),
                            name,
                        },
                    )?;
                    klog_info!("wheel: pinned ticket {} fixed for spin #1", ticket);
                }
                None => klog_warn!("wheel: pinned ticket {} is not in the entries", ticket),
            },
            None => {
                let modes = self.state.spin_modes()?;
                if modes.get(&PINNED_SPIN) != Some(&SpinMode::Fixed) {
                    self.state.set_spin_mode(PINNED_SPIN, SpinMode::Random)?;
                }
            }
        }
        Ok(())
    }

    /// Recompute which entry (if any) is pinned for the next spin.
    fn refresh_pending(&mut self) -> WheelResult<()> {
        let next = self.state.spin_count()? + 1;
        let mode = self
            .state
            .mode_for_spin(next, self.core.config.default_mode)?;
        let pinned = match mode {
            SpinMode::Fixed => self
                .state
                .designated_for(next)?
                .and_then(|d| resolve_designated(&self.core.pool, &d)),
            SpinMode::Random => None,
        };
        self.core.pending_winner = pinned;
        self.core.flags.set(WheelFlags::FIXED_PENDING, pinned.is_some());
        Ok(())
    }

    // --- spinning ---------------------------------------------------------

    /// Start a spin. Refused while spinning, while a result is shown, or
    /// when there is nothing to spin.
    pub fn spin(&mut self) -> WheelResult<SpinStarted> {
        self.ensure_not_spinning()?;
        if self.core.flags.contains(WheelFlags::RESULT_SHOWN) {
            return Err(WheelError::ResultPending);
        }
        if self.core.pool.is_empty() {
            return Err(WheelError::NoEntries);
        }

        let spin_number = self.state.spin_count()? + 1;
        let mode = self
            .state
            .mode_for_spin(spin_number, self.core.config.default_mode)?;
        let designated = self.state.designated_for(spin_number)?;

        if self.core.sampler.visible().is_empty() {
            self.core.resample();
        }

        let plan = {
            let core = &mut self.core;
            let request = PlanRequest {
                pool: &core.pool,
                visible: core.sampler.visible(),
                mode,
                designated: designated.as_ref(),
                current_rotation: core.rotation,
            };
            self.planner.plan(&request, &core.sampler, &mut core.rng)
        };

        self.state.set_spin_count(spin_number)?;
        self.disarm_resampler();
        self.core.flags.insert(WheelFlags::SPINNING | WheelFlags::FROZEN);
        self.core.sampler.show(plan.committed_batch.clone());
        self.events.batch_changed(self.core.sampler.visible());

        let started = SpinStarted {
            spin_number,
            mode: plan.mode,
            target_rotation: plan.target_rotation,
            batch_len: plan.committed_batch.len(),
        };
        klog_info!(
            "wheel: spin #{} ({}) over {} slices",
            spin_number,
            plan.mode,
            started.batch_len
        );

        let now = self.clock.uptime_ms();
        self.in_flight = Some(spin_number);
        self.animator
            .start(plan, self.core.config.spin_duration_ms, now);
        Ok(started)
    }

    /// Advance timers and the animation to the clock's current time.
    /// Returns the result on the frame that completes a spin.
    pub fn frame(&mut self) -> WheelResult<Option<SpinResult>> {
        let now = self.clock.uptime_ms();
        self.timers.run_due(now, &mut self.core);

        match self
            .animator
            .frame(now, &mut self.core.rotation, self.events.as_mut())
        {
            FrameOutcome::Completed { rotation, plan } => self.complete_spin(rotation, plan).map(Some),
            FrameOutcome::Moved(_) | FrameOutcome::Idle => Ok(None),
        }
    }

    fn complete_spin(&mut self, rotation: f64, plan: SpinPlan) -> WheelResult<SpinResult> {
        self.core.flags.remove(WheelFlags::SPINNING);
        let spin_number = match self.in_flight.take() {
            Some(spin) => spin,
            None => self.state.spin_count()?,
        };

        let Some(resolution) = resolve(rotation, &plan.committed_batch) else {
            self.core.flags.remove(WheelFlags::FROZEN);
            return Err(WheelError::NoEntries);
        };
        if let Some(predicted) = plan.predicted_index {
            if predicted != resolution.index_in_batch {
                klog_warn!(
                    "wheel: landed on slot {} but planned slot {}",
                    resolution.index_in_batch,
                    predicted
                );
            }
        }
        if self.core.pool.position_of(&resolution.entry).is_none() {
            klog_debug!("wheel: winner '{}' no longer in the pool", resolution.entry);
        }

        let result = SpinResult {
            winning_entry: resolution.entry,
            slice_index: resolution.index_in_batch,
            color_index: palette::color_index(resolution.index_in_batch),
            spin_number,
            timestamp: self.clock.now_utc(),
        };
        let mut results = self.ledger.results().to_vec();
        results.push(result.clone());
        if let Err(err) = self.state.set_winners(&results) {
            klog_error!("wheel: spin #{} not recorded: {}", spin_number, err);
            self.core.flags.remove(WheelFlags::FROZEN);
            return Err(err.into());
        }

        self.ledger.record(result.clone());
        self.core.flags.insert(WheelFlags::RESULT_SHOWN);
        self.last_result = Some(result.clone());
        self.events.winner_determined(&result);
        Ok(result)
    }

    /// Close the result. Under sequential rotation the next active set is
    /// loaded; sampling resumes either way.
    pub fn dismiss(&mut self) -> WheelResult<()> {
        if !self.core.flags.contains(WheelFlags::RESULT_SHOWN) {
            return Err(WheelError::NoWinner);
        }
        self.core
            .flags
            .remove(WheelFlags::RESULT_SHOWN | WheelFlags::FROZEN);

        if self.core.config.rotation == RotationPolicy::Sequential && self.sets.len() > 1 {
            self.current_set = (self.current_set + 1) % self.sets.len();
            klog_info!(
                "wheel: advancing to '{}'",
                self.sets[self.current_set].filename
            );
            self.reload_pool()?;
        } else {
            self.refresh_pending()?;
            self.core.resample();
        }

        let now = self.clock.uptime_ms();
        self.arm_resampler(now);
        Ok(())
    }

    /// Remove the entry that won the last spin. A successful removal also
    /// dismisses the result.
    pub fn remove_winner(&mut self) -> WheelResult<RemovalOutcome> {
        self.ensure_not_spinning()?;
        let Some(winner) = self.last_result.as_ref().map(|r| r.winning_entry.clone()) else {
            return Err(WheelError::NoWinner);
        };
        let outcome = self.remove_entry(winner.identity_ticket(), &winner.label())?;
        if outcome.is_removed() && self.core.flags.contains(WheelFlags::RESULT_SHOWN) {
            self.dismiss()?;
        }
        Ok(outcome)
    }

    /// Remove one entry by ticket, or by a name that is unique in the pool.
    pub fn remove_entry(&mut self, ticket: Option<&str>, name: &str) -> WheelResult<RemovalOutcome> {
        self.ensure_not_spinning()?;
        let plan = match self.ledger.plan_removal(&self.core.pool, ticket, name) {
            Ok(plan) => plan,
            Err(refusal) => return Ok(RemovalOutcome::Refused(refusal)),
        };
        self.state
            .set_removed_entries(&self.ledger.removed_after(&plan))?;
        let outcome = self.ledger.apply_removal(&mut self.core.pool, plan);
        if outcome.is_removed() {
            self.refresh_pending()?;
            if !self.core.flags.contains(WheelFlags::FROZEN) {
                self.core.resample();
            }
        }
        Ok(outcome)
    }

    // --- admin ------------------------------------------------------------

    pub fn set_spin_mode(&mut self, spin: SpinNumber, mode: SpinMode) -> WheelResult<()> {
        if spin == 0 {
            return Err(WheelError::InvalidSpinNumber(spin));
        }
        self.state.set_spin_mode(spin, mode)?;
        self.refresh_pending()
    }

    /// Mode for spins without a per-spin override. `None` defers to config.
    pub fn set_default_mode(&mut self, mode: Option<SpinMode>) -> WheelResult<()> {
        self.state.set_global_mode(mode)?;
        self.refresh_pending()
    }

    /// Designate the winner of `spin`, replacing any earlier choice. Returns
    /// whether it resolves against the current pool.
    pub fn designate_winner(&mut self, spin: SpinNumber, winner: DesignatedWinner) -> WheelResult<bool> {
        if spin == 0 {
            return Err(WheelError::InvalidSpinNumber(spin));
        }
        let resolves = resolve_designated(&self.core.pool, &winner).is_some();
        if !resolves {
            klog_warn!("wheel: designated '{}' does not match any entry", winner);
        }
        self.state.designate(spin, winner)?;
        self.refresh_pending()?;
        Ok(resolves)
    }

    pub fn clear_designation(&mut self, spin: SpinNumber) -> WheelResult<bool> {
        let had = self.state.clear_designation(spin)?;
        self.refresh_pending()?;
        Ok(had)
    }

    pub fn set_center_image(&mut self, image: Option<String>) -> WheelResult<()> {
        self.state.set_center_image(image.as_deref())?;
        self.center_image = image;
        Ok(())
    }

    /// Clear results, designations, modes and removals and restart the
    /// spin counter.
    pub fn reset_all(&mut self) -> WheelResult<()> {
        self.ensure_not_spinning()?;
        self.state.reset_all()?;
        self.ledger.clear();
        self.last_result = None;
        self.core
            .flags
            .remove(WheelFlags::RESULT_SHOWN | WheelFlags::FROZEN);
        self.current_set = 0;
        self.reload_pool()?;
        let now = self.clock.uptime_ms();
        self.arm_resampler(now);
        klog_info!("wheel: reset");
        Ok(())
    }

    pub fn shuffle_entries(&mut self) -> WheelResult<()> {
        self.ensure_not_spinning()?;
        let core = &mut self.core;
        core.pool.shuffle(&mut core.rng);
        self.refresh_pending()?;
        self.core.resample();
        Ok(())
    }

    pub fn sort_entries(&mut self) -> WheelResult<()> {
        self.ensure_not_spinning()?;
        self.core.pool.sort_by_name();
        self.refresh_pending()?;
        self.core.resample();
        Ok(())
    }
}
