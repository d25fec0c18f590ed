mod helpers;
mod mocks;
mod webhooks;
