mod dashboards;
mod helpers;
mod registration;
mod selectors;
mod uploads;
