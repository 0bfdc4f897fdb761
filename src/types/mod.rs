pub mod city_attributes;
pub mod forecast;
pub mod observation;
pub mod parameter;
