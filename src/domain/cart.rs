use super::lesson::{Lesson, LessonId, Price};

/// One lesson selection in the cart.
///
/// `lesson` is the snapshot taken when the line was created. It is not
/// refreshed, so the recorded `spaces` may be stale by checkout time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub lesson: Lesson,
    pub quantity: u32,
}

impl CartLine {
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson.id
    }

    pub fn subtotal(&self) -> Price {
        self.lesson.price * self.quantity
    }

    pub fn at_capacity(&self) -> bool {
        self.quantity >= self.lesson.spaces
    }
}

/// Result of offering a lesson to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Incremented,
    /// Quantity already equals the snapshot's remaining spaces.
    AtCapacity,
    /// The lesson had no spaces left when it was fetched.
    Unavailable,
}

/// Ordered collection of cart lines, unique by lesson identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `lesson`, bounded by the snapshot's remaining spaces.
    pub fn add(&mut self, lesson: &Lesson) -> AddOutcome {
        if let Some(line) = self.line_mut(&lesson.id) {
            if line.at_capacity() {
                return AddOutcome::AtCapacity;
            }
            line.quantity += 1;
            return AddOutcome::Incremented;
        }

        if !lesson.is_available() {
            return AddOutcome::Unavailable;
        }

        self.lines.push(CartLine {
            lesson: lesson.clone(),
            quantity: 1,
        });
        AddOutcome::Inserted
    }

    /// Removes the line for `id`. Returns whether a line was present.
    pub fn remove(&mut self, id: &LessonId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.lesson.id != id);
        self.lines.len() != before
    }

    /// Increments the line's quantity unless it already equals the snapshot's spaces.
    pub fn increase(&mut self, id: &LessonId) -> bool {
        match self.line_mut(id) {
            Some(line) if !line.at_capacity() => {
                line.quantity += 1;
                true
            }
            _ => false,
        }
    }

    /// Decrements the line's quantity, dropping the line instead of reaching zero.
    pub fn decrease(&mut self, id: &LessonId) -> bool {
        let Some(line) = self.line_mut(id) else {
            return false;
        };
        if line.quantity > 1 {
            line.quantity -= 1;
            true
        } else {
            self.remove(id)
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: &LessonId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.lesson.id == id)
    }

    fn line_mut(&mut self, id: &LessonId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.lesson.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `price * quantity` across all lines.
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
