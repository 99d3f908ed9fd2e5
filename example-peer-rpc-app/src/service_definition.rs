mod add;
pub use add::Add;

mod mult;
pub use mult::Mult;

mod echo;
pub use echo::Echo;
