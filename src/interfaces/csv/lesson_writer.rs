use crate::domain::lesson::Lesson;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct LessonRow<'a> {
    id: &'a str,
    subject: &'a str,
    location: &'a str,
    price: String,
    spaces: u32,
}

/// Writes lesson listings as CSV with an `id,subject,location,price,spaces` header.
pub struct LessonWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LessonWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes every lesson in the order given and flushes.
    pub fn write_lessons<'a>(&mut self, lessons: impl IntoIterator<Item = &'a Lesson>) -> Result<()> {
        for lesson in lessons {
            self.writer.serialize(LessonRow {
                id: lesson.id.as_str(),
                subject: &lesson.subject,
                location: &lesson.location,
                price: lesson.price.to_string(),
                spaces: lesson.spaces,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
