pub mod logto;
