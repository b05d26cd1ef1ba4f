pub mod design;
pub mod document;
pub mod feedback;
pub mod generated;
pub mod recipient;
pub mod template;
