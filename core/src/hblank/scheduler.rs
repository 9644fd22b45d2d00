use alloc::boxed::Box;
use alloc::vec::Vec;

use heapless::Vec as BoundedVec;
use log::{debug, error, trace};
use scanline_hal::hblank::{HblankEntry, HblankStream};
use scanline_hal::RegisterAddress;

use crate::config::{DISPLAY_HEIGHT, MAX_HBLANK_EFFECTS};
use crate::error::{Error, Result};

use super::handler::{DisplayTargets, HblankEffectHandler, TargetId};
use super::line_table::{LineTables, LineValues};

/// Handle to one scheduled effect. Stale ids are rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HblankEffectId {
    index: u8,
    generation: u16,
}

/// Type-erased view of an [`Effect`].
trait EffectSlot {
    fn update(&mut self, targets: &mut dyn DisplayTargets) -> bool;
    fn commit(&mut self) -> Option<RegisterAddress>;
    fn output(&self) -> Option<RegisterAddress>;
    fn front(&self) -> &[u16; DISPLAY_HEIGHT];
    fn visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn reload(&mut self);
    fn cleanup(&mut self, targets: &mut dyn DisplayTargets);
}

struct Effect<H: HblankEffectHandler> {
    handler: H,
    target: TargetId,
    values: LineValues<H::Input>,
    last: H::LastValue,
    tables: LineTables,
    visible: bool,
    shown: bool,
    reload: bool,
    /// Where the output goes after the next commit, `None` if it is skipped.
    next_output: Option<RegisterAddress>,
    /// Where the front table is streamed to right now.
    output: Option<RegisterAddress>,
}

impl<H: HblankEffectHandler> EffectSlot for Effect<H> {
    fn update(&mut self, targets: &mut dyn DisplayTargets) -> bool {
        self.next_output = None;
        if !self.visible || !self.handler.target_visible(self.target, targets) {
            return false;
        }

        let mut recompute = self.reload;
        if self.handler.target_updated(self.target, &mut self.last, targets) {
            recompute = true;
        }
        if !self.shown {
            self.handler.show(self.target, targets);
            self.shown = true;
            recompute = true;
        }
        self.next_output = Some(self.handler.output_register(self.target, &self.last, targets));

        if recompute {
            let values = self.values.borrow();
            self.handler.write_output_values(self.target, &self.last, &values[..DISPLAY_HEIGHT], self.tables.back_mut());
            self.reload = false;
        }
        recompute
    }

    fn commit(&mut self) -> Option<RegisterAddress> {
        self.tables.swap();
        self.output = self.next_output;
        self.output
    }

    fn output(&self) -> Option<RegisterAddress> {
        self.output
    }

    fn front(&self) -> &[u16; DISPLAY_HEIGHT] {
        self.tables.front()
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.shown = false;
        }
        self.visible = visible;
    }

    fn reload(&mut self) {
        self.reload = true;
    }

    fn cleanup(&mut self, targets: &mut dyn DisplayTargets) {
        self.handler.cleanup(self.target, targets);
        self.output = None;
        self.next_output = None;
    }
}

struct Slot {
    generation: u16,
    effect: Option<Box<dyn EffectSlot>>,
}

/// Scheduler of every active per-scanline effect.
///
/// Once per frame, outside vertical blank, [`update`](Self::update)
/// rebuilds the output of the effects whose target or input changed.
/// In vertical blank, [`commit`](Self::commit) promotes the new tables and
/// [`load_stream`](Self::load_stream) hands them to the HBlank interrupt.
/// Unchanged effects cost one `target_updated` call per frame.
pub struct HblankEffects {
    slots: BoundedVec<Slot, MAX_HBLANK_EFFECTS>,
    /// Removed effects whose tables may still be streamed.
    retired: Vec<Box<dyn EffectSlot>>,
}

impl HblankEffects {
    pub fn new() -> Self {
        Self { slots: BoundedVec::new(), retired: Vec::new() }
    }

    pub const fn capacity(&self) -> usize {
        MAX_HBLANK_EFFECTS
    }

    /// Active effects count.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.effect.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Schedules `handler` on `target`, reading one input per line from
    /// `values`. The effect starts visible and is first computed on the next
    /// [`update`](Self::update).
    pub fn create<H: HblankEffectHandler>(
        &mut self,
        handler: H,
        target: TargetId,
        values: LineValues<H::Input>,
        targets: &dyn DisplayTargets,
    ) -> Result<HblankEffectId> {
        self.create_optional(handler, target, values, targets).ok_or_else(|| {
            let error = Error::TooManyHblankEffects { capacity: MAX_HBLANK_EFFECTS };
            error!("{}", error);
            error
        })
    }

    /// Like [`create`](Self::create), but `None` when every slot is taken.
    pub fn create_optional<H: HblankEffectHandler>(
        &mut self,
        mut handler: H,
        target: TargetId,
        values: LineValues<H::Input>,
        targets: &dyn DisplayTargets,
    ) -> Option<HblankEffectId> {
        let index = match self.slots.iter().position(|slot| slot.effect.is_none()) {
            Some(index) => index,
            None => {
                self.slots.push(Slot { generation: 0, effect: None }).ok()?;
                self.slots.len() - 1
            }
        };

        let last = handler.setup_target(target, targets);
        let effect = Effect {
            handler,
            target,
            values,
            last,
            tables: LineTables::new(),
            visible: true,
            shown: false,
            reload: false,
            next_output: None,
            output: None,
        };
        let slot = &mut self.slots[index];
        slot.effect = Some(Box::new(effect));
        debug!(target: "hblank", "created effect {} on target {}", index, target.0);
        Some(HblankEffectId { index: index as u8, generation: slot.generation })
    }

    /// Stops `id` and runs its cleanup. The register it was driving goes back
    /// to its owner on the next commit.
    pub fn remove(&mut self, id: HblankEffectId, targets: &mut dyn DisplayTargets) {
        let slot = self.slot_mut(id);
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(mut effect) = slot.effect.take() {
            effect.cleanup(targets);
            self.retired.push(effect);
        }
        debug!(target: "hblank", "removed effect {}", id.index);
    }

    pub fn visible(&self, id: HblankEffectId) -> bool {
        self.effect(id).visible()
    }

    /// Hidden effects are skipped by [`update`](Self::update) and left out
    /// of the next commit. Showing an effect again runs its `show` hook and
    /// recomputes it.
    pub fn set_visible(&mut self, id: HblankEffectId, visible: bool) {
        self.effect_mut(id).set_visible(visible);
    }

    /// Marks the input table of `id` as modified.
    pub fn reload(&mut self, id: HblankEffectId) {
        self.effect_mut(id).reload();
    }

    /// Table `id` is streaming right now.
    pub fn table(&self, id: HblankEffectId) -> &[u16; DISPLAY_HEIGHT] {
        self.effect(id).front()
    }

    /// Register `id` is streaming to right now.
    pub fn output_register(&self, id: HblankEffectId) -> Option<RegisterAddress> {
        self.effect(id).output()
    }

    /// Recomputes the effects that need it. Returns how many were rewritten.
    pub fn update(&mut self, targets: &mut dyn DisplayTargets) -> usize {
        let mut recomputed = 0;
        for effect in self.slots.iter_mut().filter_map(|slot| slot.effect.as_mut()) {
            if effect.update(targets) {
                recomputed += 1;
            }
        }
        trace!(target: "hblank", "{} effects recomputed", recomputed);
        recomputed
    }

    /// Promotes the tables computed by the last update. Vertical blank only.
    /// Returns how many effects are streamed from now on.
    pub fn commit(&mut self) -> usize {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.effect.as_mut())
            .filter_map(|effect| effect.commit())
            .count()
    }

    /// Streamed effects: their register and their front table.
    pub fn committed(&self) -> impl Iterator<Item = (RegisterAddress, &[u16; DISPLAY_HEIGHT])> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.effect.as_ref())
            .filter_map(|effect| effect.output().map(|register| (register, effect.front())))
    }

    /// Points `stream` at the committed tables and frees removed effects.
    ///
    /// # Safety
    /// `stream` reads the tables owned by `self`. It has to be loaded again,
    /// or cleared, before `self` is dropped and before the next
    /// [`update`](Self::update) following a [`commit`](Self::commit).
    pub unsafe fn load_stream<const N: usize>(&mut self, stream: &mut HblankStream<N>) {
        let mut entries = BoundedVec::<HblankEntry, MAX_HBLANK_EFFECTS>::new();
        for (dest, table) in self.committed() {
            let pushed = entries.push(HblankEntry { dest, src: table.as_ptr() });
            debug_assert!(pushed.is_ok(), "More committed tables than slots");
        }
        stream.load(&entries);
        self.retired.clear();
    }

    fn slot_mut(&mut self, id: HblankEffectId) -> &mut Slot {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.generation == id.generation && slot.effect.is_some() => slot,
            _ => panic!("Invalid hblank effect id: {:?}", id),
        }
    }

    fn effect(&self, id: HblankEffectId) -> &dyn EffectSlot {
        match self.slots.get(id.index as usize) {
            Some(Slot { generation, effect: Some(effect) }) if *generation == id.generation => &**effect,
            _ => panic!("Invalid hblank effect id: {:?}", id),
        }
    }

    fn effect_mut(&mut self, id: HblankEffectId) -> &mut dyn EffectSlot {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot { generation, effect: Some(effect) }) if *generation == id.generation => &mut **effect,
            _ => panic!("Invalid hblank effect id: {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use scanline_hal::hblank::RegisterWriter;
    use scanline_hal::mosaic::Mosaic;
    use scanline_hal::oam::ObjAttributes;
    use scanline_hal::window::Axis;

    use super::*;
    use crate::hblank::handler::BgState;

    const REGISTER: RegisterAddress = RegisterAddress::new(0x0400_0040);

    #[derive(Default)]
    struct Targets {
        reloads: u32,
    }

    impl DisplayTargets for Targets {
        fn rect_window_boundaries(&self, _window: u8, _axis: Axis) -> (i32, i32) {
            (0, 0)
        }

        fn bg_hw_id(&self, _bg: TargetId) -> Option<u8> {
            None
        }

        fn bg_state(&self, _bg: TargetId) -> BgState {
            BgState::default()
        }

        fn sprite_hw_id(&self, _sprite: TargetId) -> Option<u8> {
            None
        }

        fn sprite_attributes(&self, _sprite: TargetId) -> ObjAttributes {
            ObjAttributes::default()
        }

        fn mosaic(&self) -> Mosaic {
            Mosaic::default()
        }

        fn reload_windows(&mut self) {
            self.reloads += 1;
        }
    }

    /// Adds `state` to every input value and counts its calls.
    #[derive(Clone)]
    struct Counting {
        visible: Rc<Cell<bool>>,
        state: Rc<Cell<u16>>,
        writes: Rc<Cell<u32>>,
        shows: Rc<Cell<u32>>,
    }

    impl Default for Counting {
        fn default() -> Self {
            Self {
                visible: Rc::new(Cell::new(true)),
                state: Rc::default(),
                writes: Rc::default(),
                shows: Rc::default(),
            }
        }
    }

    impl HblankEffectHandler for Counting {
        type Input = u16;
        type LastValue = u16;

        fn target_visible(&self, _target: TargetId, _targets: &dyn DisplayTargets) -> bool {
            self.visible.get()
        }

        fn setup_target(&mut self, _target: TargetId, _targets: &dyn DisplayTargets) -> u16 {
            self.state.get()
        }

        fn target_updated(&mut self, _target: TargetId, last: &mut u16, _targets: &dyn DisplayTargets) -> bool {
            let updated = *last != self.state.get();
            *last = self.state.get();
            updated
        }

        fn output_register(&self, _target: TargetId, _last: &u16, _targets: &dyn DisplayTargets) -> RegisterAddress {
            REGISTER
        }

        fn write_output_values(&mut self, _target: TargetId, last: &u16, input: &[u16], output: &mut [u16; DISPLAY_HEIGHT]) {
            self.writes.set(self.writes.get() + 1);
            for (out, value) in output.iter_mut().zip(input) {
                *out = value + last;
            }
        }

        fn show(&mut self, _target: TargetId, _targets: &mut dyn DisplayTargets) {
            self.shows.set(self.shows.get() + 1);
        }

        fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
            targets.reload_windows();
        }
    }

    fn setup() -> (HblankEffects, Targets, Counting, LineValues<u16>, HblankEffectId) {
        let mut effects = HblankEffects::new();
        let targets = Targets::default();
        let handler = Counting::default();
        let values = LineValues::from_fn(|line| line as u16);
        let id = effects.create(handler.clone(), TargetId(0), values.clone(), &targets).unwrap();
        (effects, targets, handler, values, id)
    }

    #[test]
    fn test_first_update_computes_and_shows() {
        let (mut effects, mut targets, handler, _values, id) = setup();
        assert_eq!(effects.output_register(id), None);

        assert_eq!(effects.update(&mut targets), 1);
        assert_eq!(handler.shows.get(), 1);
        assert_eq!(effects.table(id)[5], 0);

        assert_eq!(effects.commit(), 1);
        assert_eq!(effects.table(id)[5], 5);
        assert_eq!(effects.output_register(id), Some(REGISTER));
    }

    #[test]
    fn test_unchanged_effect_is_not_recomputed() {
        let (mut effects, mut targets, handler, _values, _id) = setup();
        effects.update(&mut targets);
        effects.commit();
        for _ in 0..3 {
            assert_eq!(effects.update(&mut targets), 0);
            assert_eq!(effects.commit(), 1);
        }
        assert_eq!(handler.writes.get(), 1);
        assert_eq!(handler.shows.get(), 1);
    }

    #[test]
    fn test_reload_and_target_change_recompute() {
        let (mut effects, mut targets, handler, values, id) = setup();
        effects.update(&mut targets);
        effects.commit();

        values.set(0, 100);
        effects.reload(id);
        assert_eq!(effects.update(&mut targets), 1);
        effects.commit();
        assert_eq!(effects.table(id)[0], 100);

        handler.state.set(2);
        assert_eq!(effects.update(&mut targets), 1);
        effects.commit();
        assert_eq!(effects.table(id)[0], 102);
        assert_eq!(effects.table(id)[1], 3);
        assert_eq!(handler.writes.get(), 3);
    }

    #[test]
    fn test_invisible_target_keeps_table() {
        let (mut effects, mut targets, handler, values, id) = setup();
        effects.update(&mut targets);
        effects.commit();
        let committed = *effects.table(id);

        handler.visible.set(false);
        values.set(0, 50);
        effects.reload(id);
        for _ in 0..4 {
            assert_eq!(effects.update(&mut targets), 0);
            assert_eq!(effects.commit(), 0);
            assert_eq!(effects.table(id), &committed);
            assert_eq!(effects.committed().count(), 0);
        }
        assert_eq!(handler.writes.get(), 1);

        handler.visible.set(true);
        assert_eq!(effects.update(&mut targets), 1);
        effects.commit();
        assert_eq!(effects.table(id)[0], 50);
    }

    #[test]
    fn test_hidden_effect_shows_again() {
        let (mut effects, mut targets, handler, _values, id) = setup();
        effects.update(&mut targets);
        effects.commit();

        effects.set_visible(id, false);
        assert!(!effects.visible(id));
        assert_eq!(effects.update(&mut targets), 0);
        assert_eq!(effects.commit(), 0);

        effects.set_visible(id, true);
        assert_eq!(effects.update(&mut targets), 1);
        assert_eq!(handler.shows.get(), 2);
    }

    #[test]
    fn test_remove_runs_cleanup_once() {
        let (mut effects, mut targets, handler, _values, id) = setup();
        effects.update(&mut targets);
        effects.remove(id, &mut targets);
        assert_eq!(targets.reloads, 1);
        assert!(effects.is_empty());
        assert_eq!(effects.update(&mut targets), 0);
        assert_eq!(effects.commit(), 0);
        assert_eq!(handler.writes.get(), 1);
    }

    #[test]
    #[should_panic(expected = "Invalid hblank effect id")]
    fn test_stale_id() {
        let (mut effects, mut targets, handler, values, id) = setup();
        effects.remove(id, &mut targets);
        let again = effects.create(handler, TargetId(0), values, &targets).unwrap();
        assert_ne!(again, id);
        effects.reload(id);
    }

    #[test]
    fn test_capacity() {
        let (mut effects, targets, handler, values, _id) = setup();
        for _ in 1..MAX_HBLANK_EFFECTS {
            effects.create(handler.clone(), TargetId(1), values.clone(), &targets).unwrap();
        }
        assert_eq!(effects.len(), MAX_HBLANK_EFFECTS);
        assert!(effects.create_optional(handler.clone(), TargetId(1), values.clone(), &targets).is_none());
        assert_eq!(
            effects.create(handler, TargetId(1), values, &targets),
            Err(Error::TooManyHblankEffects { capacity: MAX_HBLANK_EFFECTS })
        );
    }

    #[derive(Default)]
    struct Recorder(Vec<(RegisterAddress, u16)>);

    impl RegisterWriter for Recorder {
        fn write(&mut self, address: RegisterAddress, value: u16) {
            self.0.push((address, value));
        }
    }

    #[test]
    fn test_load_stream() {
        let (mut effects, mut targets, _handler, _values, id) = setup();
        let mut stream = HblankStream::<MAX_HBLANK_EFFECTS>::new();
        effects.update(&mut targets);
        effects.commit();
        unsafe { effects.load_stream(&mut stream) };
        assert_eq!(stream.len(), 1);

        let mut recorder = Recorder::default();
        stream.on_hblank(41, &mut recorder);
        assert_eq!(recorder.0, [(REGISTER, 42)]);

        effects.remove(id, &mut targets);
        effects.commit();
        unsafe { effects.load_stream(&mut stream) };
        assert!(stream.is_empty());
    }
}
