pub mod lesson_writer;
