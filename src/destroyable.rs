/// Implemented by anything that subscribes to a channel while the channel's
/// callback holds it; `destroy` breaks that reference cycle.
pub trait Destroyable {
    fn destroy(&mut self);
}
