mod dates;

pub use dates::year_of;
