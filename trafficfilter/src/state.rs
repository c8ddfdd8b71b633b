/// What is currently known to be true about one resource instance.
///
/// The lifecycle driver hands the tracked state to every operation and
/// persists whatever the operation leaves behind. An empty state means the
/// resource no longer exists and should be dropped from tracking.
#[derive(Clone, Debug, PartialEq)]
pub struct State<M> {
    value: Option<M>,
}

impl<M> State<M> {
    pub fn new(value: M) -> Self {
        State { value: Some(value) }
    }

    pub fn empty() -> Self {
        State { value: None }
    }

    pub fn get(&self) -> Option<&M> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: M) {
        self.value = Some(value);
    }

    pub fn remove_resource(&mut self) {
        self.value = None;
    }

    pub fn is_removed(&self) -> bool {
        self.value.is_none()
    }

    pub fn into_inner(self) -> Option<M> {
        self.value
    }
}

impl<M> Default for State<M> {
    fn default() -> Self {
        State::empty()
    }
}
