pub mod glm;
