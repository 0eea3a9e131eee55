pub mod company;
pub mod consultant;
pub mod recommendation;
