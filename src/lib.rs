pub mod controller;
pub mod dataset;
pub mod dates;
pub mod domain;
pub mod format;
pub mod headers;
pub mod html;
pub mod inputter;
pub mod model;
pub mod prefs;
pub mod record;
pub mod render;
pub mod search;
pub mod source;
pub mod tabular;
pub mod ui;
pub mod view;
