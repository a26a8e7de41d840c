// Layout controller - Owner of the on-screen order of chart containers
pub trait LayoutController: Send {
    /// Apply an order coming from the drag-and-drop surface.
    fn commit_order(&mut self, order: Vec<String>);

    fn order(&self) -> Vec<String>;
}

/// Keeps committed charts first, in the committed order, followed by any
/// charts the commit left out in their previous relative order.
#[derive(Debug, Clone, Default)]
pub struct ChartLayout {
    order: Vec<String>,
}

impl ChartLayout {
    pub fn new(initial: Vec<String>) -> Self {
        Self { order: initial }
    }
}

impl LayoutController for ChartLayout {
    fn commit_order(&mut self, order: Vec<String>) {
        let mut next: Vec<String> = Vec::with_capacity(self.order.len());
        for id in order {
            if self.order.contains(&id) && !next.contains(&id) {
                next.push(id);
            }
        }
        for id in &self.order {
            if !next.contains(id) {
                next.push(id.clone());
            }
        }
        self.order = next;
    }

    fn order(&self) -> Vec<String> {
        self.order.clone()
    }
}
