mod controls;
mod panels;
mod plan;
