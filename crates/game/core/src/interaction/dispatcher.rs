use tracing::debug;

use super::{InteractionClass, InteractionContext};
use crate::env::HasHitBox;
use crate::state::ObjectId;

/// A world object the entity can walk into.
///
/// Implementors react to the dispatcher's enter/stay/exit calls; they never
/// decide on their own whether they are the active intersection.
pub trait Interactable: HasHitBox {
    fn id(&self) -> ObjectId;

    fn class(&self) -> InteractionClass;

    fn is_alive(&self) -> bool;

    /// The entity started overlapping this object.
    fn enter(&mut self, ctx: &mut InteractionContext<'_>);

    /// Called once per tick while this object is the active intersection,
    /// including the tick it was entered.
    fn stay(&mut self, ctx: &mut InteractionContext<'_>);

    /// The entity left this object or another one took precedence.
    fn exit(&mut self, ctx: &mut InteractionContext<'_>);

    /// Prompt shown while this object is active.
    fn prompt(&self) -> Option<&'static str> {
        None
    }
}

/// One callback issued by [`IntersectionDispatcher::dispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntersectionCall {
    Enter(ObjectId),
    Stay(ObjectId),
    Exit(ObjectId),
}

/// Calls issued during one dispatch, in order, and the resulting active object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchReport {
    pub calls: Vec<IntersectionCall>,
    pub active: Option<ObjectId>,
}

impl DispatchReport {
    pub fn entered(&self) -> Option<ObjectId> {
        self.calls.iter().find_map(|c| match c {
            IntersectionCall::Enter(id) => Some(*id),
            _ => None,
        })
    }

    pub fn exited(&self) -> Option<ObjectId> {
        self.calls.iter().find_map(|c| match c {
            IntersectionCall::Exit(id) => Some(*id),
            _ => None,
        })
    }
}

/// Tracks the single interactable object the entity is currently in.
///
/// At most one object is active at a time. A change of active object always
/// exits the old one before entering the new one, within the same dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionDispatcher {
    active: Option<ObjectId>,
}

impl IntersectionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Forgets the active object without issuing an exit, e.g. on level change.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Re-evaluates the active intersection against the entity's hit-box.
    ///
    /// The candidate is the first alive object overlapping the entity, ranked
    /// by [`InteractionClass`] and then by position in `objects`. Any change
    /// runs exit on the old object and enter on the new one; afterwards the
    /// active object, if any, gets exactly one stay call.
    pub fn dispatch<I: Interactable>(
        &mut self,
        objects: &mut [I],
        ctx: &mut InteractionContext<'_>,
    ) -> DispatchReport {
        let hit_box = ctx.entity.hit_box();
        let candidate = objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_alive() && o.hit_box().intersects(&hit_box))
            .min_by_key(|(index, o)| (o.class(), *index))
            .map(|(_, o)| o.id());

        let mut report = DispatchReport::default();
        if candidate != self.active {
            debug!(from = ?self.active, to = ?candidate, "active intersection changed");
            if let Some(old) = self.active.take() {
                if let Some(object) = objects.iter_mut().find(|o| o.id() == old) {
                    object.exit(ctx);
                    report.calls.push(IntersectionCall::Exit(old));
                }
            }
            if let Some(object) = candidate.and_then(|new| objects.iter_mut().find(|o| o.id() == new)) {
                object.enter(ctx);
                report.calls.push(IntersectionCall::Enter(object.id()));
            }
            self.active = candidate;
        }

        let id = self.active;
        if let Some(object) = id.and_then(|id| objects.iter_mut().find(|o| o.id() == id)) {
            object.stay(ctx);
            report.calls.push(IntersectionCall::Stay(object.id()));
        }

        report.active = self.active;
        report
    }
}
