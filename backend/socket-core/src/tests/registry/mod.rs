mod correlation;
mod subscriptions;
